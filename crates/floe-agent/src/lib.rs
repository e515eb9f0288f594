pub mod aggregator;
pub mod client;
pub mod sse;

pub use aggregator::{Accumulator, ResponsePolicy};
pub use client::{AnalystClient, AnalystConfig};
