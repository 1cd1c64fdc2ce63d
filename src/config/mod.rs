mod env_overrides;
mod loader;
pub mod schema;

pub use loader::load_from_path;
pub use schema::{Config, LogLevel, ObservabilityConfig, PresentationConfig, SessionConfig};
