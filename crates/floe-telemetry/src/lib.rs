use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Configuration for the telemetry subsystem.
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    /// Default log level. Overridden by RUST_LOG env var.
    pub log_level: Level,
    /// Per-module level overrides (e.g. "floe_agent" => DEBUG).
    pub module_levels: Vec<(String, Level)>,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            module_levels: Vec::new(),
            json: false,
        }
    }
}

/// Initialize the tracing subscriber. Call once at startup.
pub fn init_telemetry(config: TelemetryConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Render the config as an env-filter directive string, the same form
/// RUST_LOG takes.
fn filter_directives(config: &TelemetryConfig) -> String {
    let mut directives = config.log_level.to_string().to_lowercase();
    for (module, level) in &config.module_levels {
        directives.push_str(&format!(",{}={}", module, level.to_string().to_lowercase()));
    }
    directives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_are_info() {
        assert_eq!(filter_directives(&TelemetryConfig::default()), "info");
    }

    #[test]
    fn module_overrides_are_appended() {
        let config = TelemetryConfig {
            log_level: Level::WARN,
            module_levels: vec![
                ("floe_agent".to_string(), Level::DEBUG),
                ("floe_warehouse".to_string(), Level::TRACE),
            ],
            json: false,
        };
        assert_eq!(
            filter_directives(&config),
            "warn,floe_agent=debug,floe_warehouse=trace"
        );
    }
}
