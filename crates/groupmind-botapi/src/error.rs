use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("bot gateway request failed: {0}")]
    Transport(String),

    #[error("group {group_id} not found")]
    GroupNotFound { group_id: i64 },

    #[error("member {user_id} not found in group {group_id}")]
    MemberNotFound { group_id: i64, user_id: i64 },

    #[error("message {0} not found")]
    MessageNotFound(i64),

    #[error("gateway rejected the request: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
