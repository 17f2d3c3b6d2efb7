use std::io;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_TICK_MS: u64 = 250;
const MIN_TICK_MS: u64 = 50;

#[derive(Debug, Clone)]
pub struct Config {
    pub tick: Duration,
    pub log_stdout: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(DEFAULT_TICK_MS),
            log_stdout: false,
        }
    }
}

pub fn load_config() -> Config {
    Config {
        tick: resolve_tick(),
        log_stdout: resolve_log_stdout(),
    }
}

fn resolve_tick() -> Duration {
    let millis = std::env::var("EVALDECK_TICK_MS")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_TICK_MS)
        .max(MIN_TICK_MS);
    Duration::from_millis(millis)
}

fn resolve_log_stdout() -> bool {
    std::env::var("EVALDECK_LOG_STDOUT")
        .ok()
        .and_then(|value| parse_bool_flag(&value))
        .unwrap_or(false)
}

fn parse_bool_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Route tracing away from stdout by default: log lines written into the
/// alternate screen would corrupt the dashboard.
pub fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_stdout {
        let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::sink)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_flags_parse_common_spellings() {
        assert_eq!(parse_bool_flag("1"), Some(true));
        assert_eq!(parse_bool_flag("TRUE"), Some(true));
        assert_eq!(parse_bool_flag(" off "), Some(false));
        assert_eq!(parse_bool_flag("maybe"), None);
    }

    #[test]
    fn default_config_uses_the_builtin_tick() {
        let config = Config::default();
        assert_eq!(config.tick, Duration::from_millis(DEFAULT_TICK_MS));
        assert!(!config.log_stdout);
    }
}
