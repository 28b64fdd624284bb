pub mod catalog;
pub mod embedded;
pub mod loader;
pub mod render;
pub mod trigger;

pub use catalog::{CatalogBuilder, SkillCatalog, SkippedSkill};
pub use embedded::EmbeddedSkills;
pub use loader::{SkillDocument, SkillMetadata, SkillSource};
pub use render::{RenderContext, SkillRenderer};
pub use trigger::{TriggerMatch, TriggerMatcher};
