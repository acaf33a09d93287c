//! Component E — the humanizer: a collection of background analyzers and
//! pre/post-processing passes layered around the chat turn.

pub mod emoji;
pub mod error;
pub mod expressions;
pub mod frequency;
pub mod memory;
pub mod planner;
pub mod topics;
pub mod typo;

pub use emoji::{EmojiConfig, EmojiSystem};
pub use error::{HumanizerError, Result};
pub use expressions::{ExpressionConfig, ExpressionLearner};
pub use frequency::{FrequencyConfig, FrequencyController};
pub use memory::{generate_question, run_search_agent, MemoryRetrievalConfig};
pub use planner::{Action, ActionPlanner, Decision};
pub use topics::{TopicConfig, TopicTracker};
pub use typo::{apply as apply_typos, TypoConfig};
