use thiserror::Error;

/// Failure modes for any [`crate::provider::LlmClient`] implementation
/// (: transient external vs. permanent external/malformed-JSON).
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to LLM backend failed: {0}")]
    Transport(String),

    #[error("LLM backend returned an error response: {0}")]
    Backend(String),

    #[error("failed to parse LLM response: {0}")]
    Parse(String),

    #[error("request timed out after {ms}ms")]
    Timeout { ms: u64 },
}

pub type Result<T> = std::result::Result<T, LlmError>;
