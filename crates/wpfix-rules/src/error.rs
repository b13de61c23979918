//! Errors raised while building the rule set

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Invalid PHP function name '{name}' in rename rule '{rule}'")]
    InvalidIdentifier { rule: String, name: String },

    #[error("Rename rule '{rule}' maps '{name}' to itself")]
    SameName { rule: String, name: String },

    #[error("Rule name must not be empty")]
    EmptyName,

    #[error("Rule '{0}' is already registered")]
    DuplicateName(String),
}
