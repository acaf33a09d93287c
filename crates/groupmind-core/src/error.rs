use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing required API key — refusing to initialize")]
    MissingApiKey,
}

pub type Result<T> = std::result::Result<T, CoreError>;
