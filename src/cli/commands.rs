use anyhow::{bail, Result};
use clap::Subcommand;
use serde::Serialize;
use std::sync::Arc;

use crate::skills::{RenderContext, SkillCatalog, SkillRenderer, SkillSource};

/// CLIコマンド
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// スキル一覧を表示
    List {
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },
    /// 入力に関連するスキルを検索
    Match {
        /// ユーザーの依頼文
        #[arg(required = true, num_args = 1..)]
        utterance: Vec<String>,
        /// JSONで出力
        #[arg(long)]
        json: bool,
    },
    /// スキル本文を整形して表示
    Show {
        /// スキル名
        name: String,
        /// 末尾に添えるユーザー入力
        #[arg(long)]
        input: Option<String>,
        /// <skill> タグで囲む
        #[arg(long)]
        wrap: bool,
        /// 参照ドキュメントを含めない
        #[arg(long)]
        no_references: bool,
    },
    /// カタログを検証
    Check,
}

/// コマンド実行結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// そのまま標準出力へ
    Output(String),
    /// 補足メッセージ
    Info(String),
    /// 検証成功
    Success(String),
}

/// 一覧表示用のスキル概要
#[derive(Debug, Serialize)]
struct SkillSummary<'a> {
    name: &'a str,
    description: &'a str,
    source: SkillSource,
    auto: bool,
    keywords: &'a [String],
}

/// コマンドハンドラー
pub struct CommandHandler {
    catalog: Arc<SkillCatalog>,
    max_results: usize,
}

impl CommandHandler {
    pub fn new(catalog: Arc<SkillCatalog>) -> Self {
        Self {
            catalog,
            max_results: 0,
        }
    }

    /// 検索結果の最大件数を設定（0は無制限）
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// コマンドを処理
    pub async fn handle(&self, command: &Command) -> Result<CommandResult> {
        match command {
            Command::List { json } => self.list(*json),
            Command::Match { utterance, json } => self.find(&utterance.join(" "), *json),
            Command::Show {
                name,
                input,
                wrap,
                no_references,
            } => {
                let renderer = SkillRenderer::new(Arc::clone(&self.catalog));
                let context = RenderContext {
                    args: input.clone(),
                    include_references: !no_references,
                    wrap: *wrap,
                };
                let prompt = renderer.render_by_name(name, &context).await?;
                Ok(CommandResult::Output(prompt))
            }
            Command::Check => self.check(),
        }
    }

    fn list(&self, json: bool) -> Result<CommandResult> {
        if json {
            let summaries: Vec<SkillSummary<'_>> = self
                .catalog
                .iter()
                .map(|skill| SkillSummary {
                    name: skill.name(),
                    description: skill.description(),
                    source: skill.source(),
                    auto: skill.is_auto(),
                    keywords: skill.keywords(),
                })
                .collect();
            return Ok(CommandResult::Output(serde_json::to_string_pretty(&summaries)?));
        }

        if self.catalog.is_empty() {
            return Ok(CommandResult::Info("No skills loaded".to_string()));
        }

        let lines: Vec<String> = self
            .catalog
            .iter()
            .map(|skill| format!("  /{:<20} {}", skill.name(), skill.description()))
            .collect();
        Ok(CommandResult::Output(format!("Available skills:\n{}", lines.join("\n"))))
    }

    fn find(&self, utterance: &str, json: bool) -> Result<CommandResult> {
        let mut matches = self.catalog.find_matching_skills(utterance);
        if self.max_results > 0 {
            matches.truncate(self.max_results);
        }

        if json {
            return Ok(CommandResult::Output(serde_json::to_string_pretty(&matches)?));
        }

        if matches.is_empty() {
            return Ok(CommandResult::Info("No matching skills".to_string()));
        }

        let lines: Vec<String> = matches
            .iter()
            .map(|m| {
                let reason = if m.explicit {
                    "explicit".to_string()
                } else {
                    m.matched.join(", ")
                };
                format!("  /{:<20} score {}  [{}]", m.name(), m.score, reason)
            })
            .collect();
        Ok(CommandResult::Output(format!("Matching skills:\n{}", lines.join("\n"))))
    }

    /// 読み飛ばした文書が1つでもあれば失敗
    fn check(&self) -> Result<CommandResult> {
        let skipped = self.catalog.skipped();
        if !skipped.is_empty() {
            let details: Vec<String> = skipped
                .iter()
                .map(|s| format!("  {}: {}", s.path.display(), s.reason))
                .collect();
            bail!(
                "Catalog has {} invalid skill document(s):\n{}",
                skipped.len(),
                details.join("\n")
            );
        }

        let embedded = self
            .catalog
            .iter()
            .filter(|s| s.source() == SkillSource::Embedded)
            .count();
        let directory = self.catalog.len() - embedded;

        let mut report = format!(
            "Catalog OK: {} skills ({} embedded, {} from directories)",
            self.catalog.len(),
            embedded,
            directory
        );

        let unreachable: Vec<&str> = self
            .catalog
            .iter()
            .filter(|s| s.keywords().is_empty())
            .map(|s| s.name())
            .collect();
        if !unreachable.is_empty() {
            report.push_str(&format!(
                "\nNo trigger keywords (only reachable by name): {}",
                unreachable.join(", ")
            ));
        }

        Ok(CommandResult::Success(report))
    }
}
