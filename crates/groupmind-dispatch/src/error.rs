use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] groupmind_store::StoreError),

    #[error(transparent)]
    Gateway(#[from] groupmind_botapi::GatewayError),

    #[error(transparent)]
    Humanizer(#[from] groupmind_humanizer::HumanizerError),

    #[error(transparent)]
    Skill(#[from] groupmind_skills::SkillError),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
