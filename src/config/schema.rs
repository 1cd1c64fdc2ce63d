use crate::error::ConfigError;
use crate::presentation::ConfirmationTemplate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Path to config.toml - computed at load time, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub presentation: PresentationConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.session.validate()?;
        self.presentation.validate()
    }
}

// ── Session ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Upper bound for every call to the host (fetch, align, restore).
    pub operation_timeout_ms: u64,
    /// Longest alignment label shown before truncating with "...".
    pub summary_max_chars: usize,
}

impl SessionConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.operation_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "session.operation_timeout_ms must be greater than 0".into(),
            ));
        }
        if self.summary_max_chars < 4 {
            return Err(ConfigError::Validation(
                "session.summary_max_chars must be at least 4".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            operation_timeout_ms: 30_000,
            summary_max_chars: 40,
        }
    }
}

// ── Presentation ────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Tera template for the message shown after an alignment.
    /// Variables: `reference`, `targets`.
    pub confirmation_template: String,
    pub notify_on_success: bool,
}

impl PresentationConfig {
    pub fn confirmation(&self) -> ConfirmationTemplate {
        ConfirmationTemplate::new(self.confirmation_template.clone())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.confirmation()
            .render("reference", &["target".to_string()])
            .map(|_| ())
            .map_err(|e| {
                ConfigError::Validation(format!("presentation.confirmation_template: {e}"))
            })
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            confirmation_template: ConfirmationTemplate::DEFAULT.into(),
            notify_on_success: true,
        }
    }
}

// ── Observability ───────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub log_level: LogLevel,
}
