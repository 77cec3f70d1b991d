use thiserror::Error;

/// Failures raised by the document store and its collection accessor.
///
/// None of these are fatal; the HTTP layer maps each one to a 4xx/5xx
/// response via `AppError`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("Index {index} not in range")]
    OutOfRange { index: String },

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("No id left to assign in {collection}")]
    IdsExhausted { collection: &'static str },

    #[error("Failed to persist document: {0:#}")]
    Persistence(#[source] anyhow::Error),
}
