use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::embedded::EmbeddedSkills;
use super::loader::{SkillDocument, SkillSource};
use super::trigger::{TriggerMatch, TriggerMatcher};
use crate::error::{CatalogError, Result};

/// 読み込み時にパースできず読み飛ばした文書
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedSkill {
    pub path: PathBuf,
    pub reason: String,
}

/// スキルカタログのビルダー - 読み込みフェーズでのみ変更可能
///
/// 重複名の扱い:
/// - 探索パスのスキルは同名の埋め込みスキルを上書きする
/// - それ以外の重複（同じ読み込み元同士など）は `DuplicateName` で拒否する
pub struct CatalogBuilder {
    skills: BTreeMap<String, SkillDocument>,
    search_paths: Vec<PathBuf>,
    include_embedded: bool,
    skipped: Vec<SkippedSkill>,
}

impl CatalogBuilder {
    /// 空のビルダーを作成
    pub fn new() -> Self {
        Self {
            skills: BTreeMap::new(),
            search_paths: Vec::new(),
            include_embedded: false,
            skipped: Vec::new(),
        }
    }

    /// 埋め込みスキルも読み込む
    pub fn with_embedded(mut self) -> Self {
        self.include_embedded = true;
        self
    }

    /// 探索パスを追加
    pub fn add_search_path(&mut self, path: PathBuf) {
        self.search_paths.push(path);
    }

    /// 埋め込みスキル → 探索パスの順に読み込み
    pub async fn load_all(&mut self) -> Result<()> {
        if self.include_embedded {
            self.load_embedded()?;
        }

        for path in self.search_paths.clone() {
            if path.is_dir() {
                let loaded = self.load_from_directory(&path).await?;
                tracing::info!("Loaded {} skills from {}", loaded, path.display());
            } else {
                tracing::debug!("Skipping missing skill directory: {}", path.display());
            }
        }
        Ok(())
    }

    /// 埋め込みスキルを読み込み
    pub fn load_embedded(&mut self) -> Result<()> {
        for path in EmbeddedSkills::skill_files() {
            let Some(content) = EmbeddedSkills::get_content(&path) else {
                continue;
            };
            match SkillDocument::load_from_string(
                &content,
                &format!("embedded://{}", path),
                SkillSource::Embedded,
            ) {
                Ok(skill) => {
                    tracing::debug!("Loaded embedded skill: {}", skill.name());
                    self.insert(skill)?;
                }
                Err(e) => {
                    tracing::warn!("Failed to parse embedded skill {}: {}", path, e);
                    self.skipped.push(SkippedSkill {
                        path: PathBuf::from(format!("embedded://{}", path)),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// 指定ディレクトリからスキルを読み込み
    ///
    /// ディレクトリ自体の SKILL.md と、直下の各サブディレクトリの SKILL.md を対象とする。
    /// パースできない文書は警告を出して読み飛ばす。
    pub async fn load_from_directory(&mut self, dir: &Path) -> Result<usize> {
        let mut candidates = Vec::new();

        let own_skill = dir.join("SKILL.md");
        if own_skill.is_file() {
            candidates.push(own_skill);
        }

        let mut entries = fs::read_dir(dir).await.map_err(|e| CatalogError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let mut subdirs = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| CatalogError::Io {
            path: dir.to_path_buf(),
            source: e,
        })? {
            let path = entry.path();
            if path.is_dir() {
                subdirs.push(path);
            }
        }
        // read_dirの順序は不定なので名前順に揃える
        subdirs.sort();

        for subdir in subdirs {
            let skill_file = subdir.join("SKILL.md");
            if skill_file.is_file() {
                candidates.push(skill_file);
            }
        }

        let mut loaded = 0;
        for skill_file in candidates {
            match SkillDocument::load_from_file(&skill_file, SkillSource::Directory).await {
                Ok(skill) => {
                    tracing::info!("Loaded skill: {} from {}", skill.name(), skill_file.display());
                    self.insert(skill)?;
                    loaded += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping skill {}: {}", skill_file.display(), e);
                    self.skipped.push(SkippedSkill {
                        path: skill_file,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(loaded)
    }

    /// スキルを登録
    pub fn insert(&mut self, skill: SkillDocument) -> Result<()> {
        match self.skills.get(skill.name()) {
            None => {}
            Some(existing)
                if existing.source() == SkillSource::Embedded
                    && skill.source() == SkillSource::Directory =>
            {
                tracing::info!(
                    "Skill '{}' from {} overrides embedded skill",
                    skill.name(),
                    skill.path().display()
                );
            }
            Some(existing) => {
                return Err(CatalogError::DuplicateName {
                    name: skill.name().to_string(),
                    first: existing.path().to_path_buf(),
                    second: skill.path().to_path_buf(),
                });
            }
        }

        self.skills.insert(skill.name().to_string(), skill);
        Ok(())
    }

    /// 読み取り専用のカタログを確定
    pub fn build(self) -> SkillCatalog {
        for skill in self.skills.values() {
            if let Some(parent) = skill.parent() {
                if !self.skills.contains_key(parent) {
                    tracing::warn!("Skill '{}' references unknown parent '{}'", skill.name(), parent);
                }
            }
        }
        SkillCatalog {
            skills: self.skills,
            skipped: self.skipped,
        }
    }
}

impl Default for CatalogBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// スキルカタログ - 読み込み後は読み取り専用
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    skills: BTreeMap<String, SkillDocument>,
    skipped: Vec<SkippedSkill>,
}

impl SkillCatalog {
    /// 埋め込みスキルのみのカタログ
    pub fn builtin() -> Result<Self> {
        let mut builder = CatalogBuilder::new().with_embedded();
        builder.load_embedded()?;
        Ok(builder.build())
    }

    /// 名前でスキルを取得
    pub fn get(&self, name: &str) -> Option<&SkillDocument> {
        self.skills.get(name)
    }

    /// スキル名一覧（昇順）
    pub fn names(&self) -> Vec<&str> {
        self.skills.keys().map(|s| s.as_str()).collect()
    }

    /// 読み込み時に読み飛ばした文書
    pub fn skipped(&self) -> &[SkippedSkill] {
        &self.skipped
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillDocument> {
        self.skills.values()
    }

    /// 入力に関連するスキルを検索（該当なしは空の結果）
    pub fn find_matching_skills(&self, utterance: &str) -> Vec<TriggerMatch<'_>> {
        TriggerMatcher::new(self).detect(utterance)
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}
