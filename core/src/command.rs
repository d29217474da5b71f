use crate::profile::{FieldValue, ProfileField};
use serde::{Deserialize, Serialize};

/// Every command the presentation layer may issue.
/// Variants added over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum SessionCommand {
    EditField {
        field: ProfileField,
        value: FieldValue,
    },
    Submit,
    Simulate,
}

impl SessionCommand {
    pub fn name(&self) -> &'static str {
        match self {
            SessionCommand::EditField { .. } => "edit_field",
            SessionCommand::Submit           => "submit",
            SessionCommand::Simulate         => "simulate",
        }
    }
}
