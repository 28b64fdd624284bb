use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::trigger::normalize;
use crate::error::{CatalogError, Result};

/// スキルのメタデータ（YAML frontmatter）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillMetadata {
    /// スキル名（カタログ内で一意）
    #[serde(default)]
    pub name: String,
    /// トリガー説明
    #[serde(default)]
    pub description: String,
    /// トリガーキーワード
    #[serde(default)]
    pub triggers: Vec<String>,
    /// ホスト側で自動適用してよいか
    #[serde(default)]
    pub auto: bool,
    /// 親スキル名
    #[serde(default)]
    pub parent: Option<String>,
}

/// スキルの読み込み元
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillSource {
    /// バイナリに埋め込まれた組み込みスキル
    Embedded,
    /// 探索パスから読み込んだスキル
    Directory,
}

impl fmt::Display for SkillSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillSource::Embedded => write!(f, "embedded"),
            SkillSource::Directory => write!(f, "directory"),
        }
    }
}

/// スキル文書
///
/// 読み込み後は不変。フィールドは非公開で、参照用のゲッターのみ提供する。
#[derive(Debug, Clone)]
pub struct SkillDocument {
    metadata: SkillMetadata,
    body: String,
    path: PathBuf,
    source: SkillSource,
    /// 正規化済みのトリガーキーワード
    keywords: Vec<String>,
}

impl SkillDocument {
    /// SKILL.mdファイルからスキルを読み込み
    pub async fn load_from_file(path: &Path, source: SkillSource) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| CatalogError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        Self::parse(&content, path.to_path_buf(), source)
    }

    /// 文字列からスキルを読み込み（埋め込みリソース用）
    pub fn load_from_string(content: &str, virtual_path: &str, source: SkillSource) -> Result<Self> {
        Self::parse(content, PathBuf::from(virtual_path), source)
    }

    /// ファイル内容をパース
    pub fn parse(content: &str, path: PathBuf, source: SkillSource) -> Result<Self> {
        let (mut metadata, body) = Self::extract_frontmatter(content, &path)?;

        metadata.name = metadata.name.trim().to_string();
        if metadata.name.is_empty() {
            return Err(CatalogError::MissingName { path });
        }

        let keywords = derive_keywords(&metadata);

        Ok(Self {
            metadata,
            body,
            path,
            source,
            keywords,
        })
    }

    /// frontmatter（---で囲まれた部分）を抽出
    fn extract_frontmatter(content: &str, path: &Path) -> Result<(SkillMetadata, String)> {
        let content = content.trim_start_matches('\u{feff}').trim();

        // 開始・終了の区切りはどちらも "---" だけの行
        let mut lines = content.split_inclusive('\n');
        let opening = lines.next().unwrap_or("");
        if opening.trim() != "---" {
            return Err(CatalogError::InvalidFrontmatter {
                path: path.to_path_buf(),
                reason: "missing opening ---".to_string(),
            });
        }

        let mut consumed = opening.len();
        let mut yaml_end = None;
        for line in lines {
            if line.trim() == "---" {
                yaml_end = Some(consumed);
                consumed += line.len();
                break;
            }
            consumed += line.len();
        }

        let yaml_end = yaml_end.ok_or_else(|| CatalogError::InvalidFrontmatter {
            path: path.to_path_buf(),
            reason: "missing closing ---".to_string(),
        })?;

        let yaml_content = content[opening.len()..yaml_end].trim();
        let body = content[consumed..].trim();

        if yaml_content.is_empty() {
            return Err(CatalogError::MissingName {
                path: path.to_path_buf(),
            });
        }

        let metadata: SkillMetadata =
            serde_yaml::from_str(yaml_content).map_err(|e| CatalogError::Yaml {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok((metadata, body.to_string()))
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// トリガー説明
    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    /// 本文（Markdown）
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> SkillSource {
        self.source
    }

    pub fn is_auto(&self) -> bool {
        self.metadata.auto
    }

    pub fn parent(&self) -> Option<&str> {
        self.metadata.parent.as_deref()
    }

    /// マッチングに使う正規化済みキーワード
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// triggersが空の場合は説明文中の "..." フレーズをキーワードとして使う
fn derive_keywords(metadata: &SkillMetadata) -> Vec<String> {
    let raw: Vec<String> = if metadata.triggers.is_empty() {
        let re = match Regex::new(r#""([^"]+)""#) {
            Ok(r) => r,
            Err(_) => return Vec::new(),
        };
        re.captures_iter(&metadata.description)
            .map(|c| c[1].to_string())
            .collect()
    } else {
        metadata.triggers.clone()
    };

    let mut keywords: Vec<String> = Vec::new();
    for keyword in raw.iter().map(|k| normalize(k)) {
        if !keyword.is_empty() && !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }
    keywords
}
