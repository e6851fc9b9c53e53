#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with code {code}")]
    NotFound { entity: &'static str, code: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cell ({row}, {col}) is outside a {size}x{size} board")]
    OutOfBounds { row: usize, col: usize, size: usize },

    #[error("Internal error: {0}")]
    Internal(String),
}
