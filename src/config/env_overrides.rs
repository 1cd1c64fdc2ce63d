use super::Config;
use super::schema::LogLevel;

impl Config {
    pub fn apply_env_overrides(&mut self) {
        if let Ok(timeout) = std::env::var("ALIGNTOOL_TIMEOUT_MS")
            && let Ok(ms) = timeout.parse::<u64>()
            && ms > 0
        {
            self.session.operation_timeout_ms = ms;
        }

        if let Ok(level) = std::env::var("ALIGNTOOL_LOG")
            && let Ok(level) = level.parse::<LogLevel>()
        {
            self.observability.log_level = level;
        }
    }
}
