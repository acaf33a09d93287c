use thiserror::Error;

#[derive(Debug, Error)]
pub enum HumanizerError {
    #[error(transparent)]
    Store(#[from] groupmind_store::StoreError),

    #[error(transparent)]
    Llm(#[from] groupmind_llm::LlmError),

    #[error("malformed LLM analysis output: {0}")]
    BadAnalysis(String),
}

pub type Result<T> = std::result::Result<T, HumanizerError>;
