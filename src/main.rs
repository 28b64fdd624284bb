use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use ddd_skills::{
    cli::{print_error, print_result},
    CatalogBuilder, Command, CommandHandler, Config,
};

#[derive(Parser, Debug)]
#[command(name = "ddd-skills")]
#[command(about = "DDDパターンのスキル文書カタログ")]
#[command(version)]
struct Args {
    /// 設定ファイルパス
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 追加のスキルディレクトリ（複数指定可）
    #[arg(short, long = "skills-dir")]
    skills_dir: Vec<PathBuf>,

    /// 埋め込みスキルを読み込まない
    #[arg(long)]
    no_embedded: bool,

    /// 詳細ログを表示 (INFO level)
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    // トレーシング初期化（デフォルトはWARN、--verboseでINFO）
    let args = Args::parse();
    let default_level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    // 明示指定の設定ファイルは読めなければエラー
    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_default().unwrap_or_else(|e| {
            tracing::warn!("Failed to load default config: {:#}, using defaults", e);
            Config::default()
        }),
    };

    tracing::info!("ddd-skills v{} starting...", ddd_skills::VERSION);

    let mut builder = CatalogBuilder::new();
    if config.catalog.embedded && !args.no_embedded {
        builder = builder.with_embedded();
    }
    for path in config.search_paths().into_iter().chain(args.skills_dir) {
        builder.add_search_path(path);
    }

    builder
        .load_all()
        .await
        .context("Failed to load skill catalog")?;
    let catalog = Arc::new(builder.build());
    tracing::info!("Loaded {} skills", catalog.len());

    let handler = CommandHandler::new(catalog).with_max_results(config.matching.max_results);
    let result = handler.handle(&args.command).await?;
    print_result(&result);

    Ok(())
}
