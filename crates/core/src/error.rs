use thiserror::Error;

/// Errors raised when parsing model identifiers or checking caller input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    #[error("unknown achievement: {0}")]
    UnknownAchievement(String),

    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}
