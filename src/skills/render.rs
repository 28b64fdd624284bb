use std::path::Path;
use std::sync::Arc;
use tokio::fs;

use super::catalog::SkillCatalog;
use super::embedded::EmbeddedSkills;
use super::loader::{SkillDocument, SkillSource};
use crate::error::{CatalogError, Result};

const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// レンダリングオプション
#[derive(Debug, Clone)]
pub struct RenderContext {
    /// スキルに添えるユーザー入力
    pub args: Option<String>,
    /// 同じディレクトリの参照ドキュメントを含めるか
    pub include_references: bool,
    /// `<skill name="...">` タグで囲むか
    pub wrap: bool,
}

impl RenderContext {
    pub fn new(args: Option<String>) -> Self {
        Self {
            args,
            include_references: true,
            wrap: false,
        }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(None)
    }
}

/// スキル本文をホストへ注入する形に整形する
pub struct SkillRenderer {
    catalog: Arc<SkillCatalog>,
}

impl SkillRenderer {
    pub fn new(catalog: Arc<SkillCatalog>) -> Self {
        Self { catalog }
    }

    /// スキル名から整形
    pub async fn render_by_name(&self, name: &str, context: &RenderContext) -> Result<String> {
        let skill = self
            .catalog
            .get(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))?;

        self.render(skill, context).await
    }

    /// 親スキル → 本文 → 参照ドキュメント → ユーザー入力 の順で連結
    pub async fn render(&self, skill: &SkillDocument, context: &RenderContext) -> Result<String> {
        let mut sections: Vec<String> = Vec::new();

        // 親は1段のみ辿る
        if let Some(parent_name) = skill.parent().filter(|p| *p != skill.name()) {
            match self.catalog.get(parent_name) {
                Some(parent) => sections.push(parent.body().to_string()),
                None => tracing::warn!(
                    "Parent skill '{}' of '{}' not found",
                    parent_name,
                    skill.name()
                ),
            }
        }

        sections.push(skill.body().to_string());

        if context.include_references {
            sections.extend(self.find_reference_docs(skill).await?);
        }

        if let Some(args) = context.args.as_deref().filter(|a| !a.trim().is_empty()) {
            sections.push(format!("User input: {}", args.trim()));
        }

        let prompt = sections.join(SECTION_SEPARATOR);
        if context.wrap {
            Ok(wrap_skill(skill.name(), &prompt))
        } else {
            Ok(prompt)
        }
    }

    /// 参照ドキュメント（同じディレクトリ内のSKILL.md以外の.md）を探索
    async fn find_reference_docs(&self, skill: &SkillDocument) -> Result<Vec<String>> {
        if skill.source() == SkillSource::Embedded {
            let path_str = skill.path().to_string_lossy();
            let embedded_path = path_str.strip_prefix("embedded://").unwrap_or(path_str.as_ref());
            return Ok(EmbeddedSkills::reference_files(embedded_path)
                .iter()
                .filter_map(|file| EmbeddedSkills::get_content(file))
                .map(|content| content.trim().to_string())
                .collect());
        }

        let Some(parent_dir) = skill.path().parent().filter(|p| p.is_dir()) else {
            return Ok(Vec::new());
        };

        let mut files = Vec::new();
        let mut entries = fs::read_dir(parent_dir).await.map_err(|e| io_error(parent_dir, e))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| io_error(parent_dir, e))? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if filename.ends_with(".md") && filename != "SKILL.md" {
                files.push(path);
            }
        }
        files.sort();

        let mut docs = Vec::new();
        for file in files {
            match fs::read_to_string(&file).await {
                Ok(content) => docs.push(content.trim().to_string()),
                Err(e) => tracing::warn!("Failed to read reference doc {}: {}", file.display(), e),
            }
        }
        Ok(docs)
    }

    /// スキルをシステムプロンプト形式に変換
    pub fn to_system_prompt(&self, skill: &SkillDocument) -> String {
        wrap_skill(skill.name(), skill.body())
    }
}

fn wrap_skill(name: &str, content: &str) -> String {
    format!("<skill name=\"{}\">\n{}\n</skill>", name, content)
}

fn io_error(path: &Path, source: std::io::Error) -> CatalogError {
    CatalogError::Io {
        path: path.to_path_buf(),
        source,
    }
}
