pub mod cli;
pub mod handlers;
pub mod parser;
pub mod types;

pub use cli::{Cli, Commands};
pub use handlers::{SessionContext, handle_command};
pub use parser::parse_command;
pub use types::{Command, CommandResult};
