pub mod credentials;
pub mod errors;
pub mod result;
pub mod stream;
pub mod table;
