//! 設定ファイル管理モジュール
//!
//! config/default.toml などから設定を読み込み、型安全な設定構造体を提供します。
//! ファイルがない場合はデフォルト値で動作します。

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 設定ファイルパスを上書きする環境変数
pub const CONFIG_ENV_VAR: &str = "DDD_SKILLS_CONFIG";

/// アプリケーション全体の設定
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// カタログ関連設定
    #[serde(default)]
    pub catalog: CatalogConfig,
    /// マッチング関連設定
    #[serde(default)]
    pub matching: MatchingConfig,
}

/// カタログ読み込み設定
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// 埋め込みスキルを読み込むか
    #[serde(default = "default_embedded")]
    pub embedded: bool,
    /// 追加のスキルディレクトリ（`~/` はホームディレクトリに展開）
    #[serde(default)]
    pub search_paths: Vec<String>,
}

/// マッチング設定
#[derive(Debug, Clone, Deserialize)]
pub struct MatchingConfig {
    /// 表示する最大件数（0は無制限）
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_embedded() -> bool {
    true
}

fn default_max_results() -> usize {
    5
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            embedded: default_embedded(),
            search_paths: Vec::new(),
        }
    }
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

impl Config {
    /// TOMLファイルから設定を読み込む
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// TOML文字列から設定をパース
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML config")
    }

    /// 設定ファイルの候補パスを取得（存在するものがなければNone）
    pub fn default_config_path() -> Option<PathBuf> {
        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(config_path));
        }

        let cwd_config = PathBuf::from("config/default.toml");
        if cwd_config.exists() {
            return Some(cwd_config);
        }

        dirs::home_dir()
            .map(|home| home.join(".ddd-skills").join("config.toml"))
            .filter(|path| path.exists())
    }

    /// デフォルトの場所から読み込み（見つからなければデフォルト値）
    pub fn load_default() -> Result<Self> {
        match Self::default_config_path() {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                Self::load_from_file(&path)
            }
            None => Ok(Self::default()),
        }
    }

    /// 探索パスを展開して返す
    pub fn search_paths(&self) -> Vec<PathBuf> {
        self.catalog
            .search_paths
            .iter()
            .map(|p| expand_home(p))
            .collect()
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[catalog]
embedded = false
search_paths = ["/opt/skills", "./skills"]

[matching]
max_results = 2
"#;
        let config = Config::parse(toml_content).unwrap();

        assert!(!config.catalog.embedded);
        assert_eq!(config.catalog.search_paths, vec!["/opt/skills", "./skills"]);
        assert_eq!(config.matching.max_results, 2);
        assert_eq!(
            config.search_paths(),
            vec![PathBuf::from("/opt/skills"), PathBuf::from("./skills")]
        );
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();

        assert!(config.catalog.embedded);
        assert!(config.catalog.search_paths.is_empty());
        assert_eq!(config.matching.max_results, 5);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse("[catalog]\nsearch_paths = [\"x\"]\n").unwrap();

        assert!(config.catalog.embedded); // デフォルト値
        assert_eq!(config.matching.max_results, 5);

        let config = Config::parse("").unwrap();
        assert!(config.catalog.embedded);
    }

    #[test]
    fn test_invalid_config() {
        assert!(Config::parse("[matching]\nmax_results = \"many\"\n").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[matching]\nmax_results = 0\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.matching.max_results, 0);

        assert!(Config::load_from_file(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_config_lookup_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.toml");
        std::fs::write(&path, "[matching]\nmax_results = 9\n").unwrap();

        // 環境変数が最優先
        std::env::set_var(CONFIG_ENV_VAR, &path);
        let found = Config::default_config_path();
        let loaded = Config::load_default();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(found, Some(path));
        assert_eq!(loaded.unwrap().matching.max_results, 9);

        // 次にカレントディレクトリの config/default.toml
        assert_eq!(
            Config::default_config_path(),
            Some(PathBuf::from("config/default.toml"))
        );
        assert!(Config::load_default().unwrap().catalog.embedded);
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/skills"), home.join("skills"));
        }
    }
}
