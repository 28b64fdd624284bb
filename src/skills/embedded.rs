//! 埋め込みスキルアセット
//!
//! ビルド時に assets/ ディレクトリをバイナリに埋め込み、
//! 探索パスがなくても組み込みスキルを利用可能にする

use rust_embed::Embed;

/// 埋め込みスキルアセット
#[derive(Embed)]
#[folder = "assets/"]
#[prefix = ""]
pub struct EmbeddedSkills;

impl EmbeddedSkills {
    /// スキルファイル一覧を取得（パス順）
    pub fn skill_files() -> Vec<String> {
        let mut files: Vec<String> = Self::iter()
            .filter(|path| path.starts_with("skills/") && path.ends_with("/SKILL.md"))
            .map(|s| s.to_string())
            .collect();
        files.sort();
        files
    }

    /// 同じディレクトリにある参照ドキュメント（SKILL.md以外の.md）を取得
    pub fn reference_files(skill_file: &str) -> Vec<String> {
        let Some((dir, _)) = skill_file.rsplit_once('/') else {
            return Vec::new();
        };
        let prefix = format!("{}/", dir);

        let mut files: Vec<String> = Self::iter()
            .filter(|path| {
                path.starts_with(&prefix)
                    && path.ends_with(".md")
                    && !path.ends_with("/SKILL.md")
                    && !path[prefix.len()..].contains('/')
            })
            .map(|s| s.to_string())
            .collect();
        files.sort();
        files
    }

    /// ファイル内容を取得
    pub fn get_content(path: &str) -> Option<String> {
        Self::get(path).map(|f| String::from_utf8_lossy(&f.data).to_string())
    }
}
