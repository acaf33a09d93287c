pub mod error;
pub mod registry;
pub mod types;

pub use error::SkillError;
pub use registry::SkillRegistry;
pub use types::{Skill, SkillSession};
