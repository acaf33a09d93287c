use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("llm error: {0}")]
    Llm(#[from] groupmind_llm::LlmError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
