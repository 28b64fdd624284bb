//! 色付き出力モジュール
//!
//! CLIの出力を色分けして表示するためのユーティリティ関数を提供

use crossterm::{
    execute,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::io::{self, Write};

use super::commands::CommandResult;

/// エラーメッセージを赤色で標準エラー出力へ
pub fn print_error(msg: &str) {
    let mut stderr = io::stderr();
    let _ = execute!(
        stderr,
        SetForegroundColor(Color::Red),
        SetAttribute(Attribute::Bold),
        Print("Error:"),
        SetAttribute(Attribute::Reset),
        ResetColor,
        Print(format!(" {}\n", msg))
    );
    let _ = stderr.flush();
}

/// 成功メッセージを緑色で出力
pub fn print_success(msg: &str) {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        SetForegroundColor(Color::Green),
        Print(format!("{}\n", msg)),
        ResetColor
    );
    let _ = stdout.flush();
}

/// 情報メッセージを青色で出力
pub fn print_info(msg: &str) {
    let mut stdout = io::stdout();
    let _ = execute!(
        stdout,
        SetForegroundColor(Color::Blue),
        Print(format!("{}\n", msg)),
        ResetColor
    );
    let _ = stdout.flush();
}

/// 色なしでそのまま出力（パイプ先でも扱いやすいように）
pub fn print_plain(msg: &str) {
    let mut stdout = io::stdout();
    let _ = writeln!(stdout, "{}", msg);
    let _ = stdout.flush();
}

/// コマンド実行結果を種類に応じて出力
pub fn print_result(result: &CommandResult) {
    match result {
        CommandResult::Output(text) => print_plain(text),
        CommandResult::Info(text) => print_info(text),
        CommandResult::Success(text) => print_success(text),
    }
}
