use crate::structure::StructureId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    List,
    Reference(StructureId),
    Target(StructureId),
    Submit,
    Retry,
    Undo,
    Status,
    Add { id: StructureId, name: String },
    Remove(StructureId),
    Reset(StructureId),
    Help,
    Quit,
}

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub text: String,
    pub exit: bool,
}

impl CommandResult {
    pub fn visible(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exit: false,
        }
    }

    pub fn exit(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            exit: true,
        }
    }
}
