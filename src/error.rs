pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing API credential: {0}")]
    MissingCredential(String),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Whether an `InvalidResponse` looks model/endpoint-specific, i.e. worth
    /// retrying against the next fallback model. Credential and transport
    /// failures are never retried.
    pub fn is_model_specific(&self) -> bool {
        match self {
            Error::InvalidResponse(msg) => {
                msg.contains("API 400") || msg.contains("API 404") || msg.contains("No candidate")
            }
            _ => false,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Error::NotFound("Resource not found".to_string()),
            other => Error::Database(other),
        }
    }
}
