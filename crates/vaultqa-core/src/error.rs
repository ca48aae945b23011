use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
