//! ddd-skills: DDDパターンのスキル文書カタログ
//!
//! Factory / Value Object などの設計パターンを解説するスキル文書（SKILL.md）を
//! 読み込み、ユーザーの依頼文からトリガーキーワードで該当スキルを検索する。
//! 読み込み後のカタログは読み取り専用。

pub mod cli;
pub mod config;
pub mod error;
pub mod skills;

// 主要な型の再エクスポート
pub use cli::{Command, CommandHandler, CommandResult};
pub use config::{CatalogConfig, Config, MatchingConfig};
pub use error::CatalogError;
pub use skills::{
    CatalogBuilder, RenderContext, SkillCatalog, SkillDocument, SkillMetadata, SkillRenderer,
    SkillSource, TriggerMatch, TriggerMatcher,
};

/// バージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
