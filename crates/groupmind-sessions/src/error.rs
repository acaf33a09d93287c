pub use groupmind_store::StoreError as SessionError;

pub type Result<T> = std::result::Result<T, SessionError>;
