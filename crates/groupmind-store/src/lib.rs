pub mod db;
pub mod emojis;
pub mod error;
pub mod expressions;
pub mod messages;
pub mod sessions;
pub mod store;
pub mod topics;
pub mod types;

pub use error::StoreError;
pub use store::Store;
pub use types::{Emoji, Expression, Message, NewMessage, Session, Topic};
