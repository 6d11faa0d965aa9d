use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TacticError {
    #[error("Player ID \"{0}\" already exists.")]
    DuplicatePlayerId(String),
    #[error("Step \"{0}\" not found.")]
    StepNotFound(String),
    #[error("Cannot remove the last step.")]
    LastStep,
    #[error("Invalid Play File Format: {0}")]
    InvalidFile(String),
    #[error("File access failed: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, TacticError>;
