/// Domain-level error shared by every `signdesk` crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The operation needs state that is not there yet (no participant
    /// opened, document still rendering).
    #[error("Not ready: {0}")]
    NotReady(&'static str),

    #[error("Not signed in: {0}")]
    Unauthorized(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}
