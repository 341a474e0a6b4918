use clap::Parser;
use std::path::PathBuf;

/// コマンドライン引数。ここで指定した値は設定ファイル・環境変数より優先される。
#[derive(Parser, Debug)]
#[command(
    name = "jira-worklog-extractor",
    about = "Extract Jira Cloud worklogs for a date window into CSV reports"
)]
pub struct Args {
    /// 設定ファイル（TOML）のパス
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 出力ファイルパス（省略時はタイムスタンプ付きの既定名）
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// デバッグログを有効にする
    #[arg(short, long)]
    pub verbose: bool,

    /// 同時に処理する課題数の上限
    #[arg(long)]
    pub max_workers: Option<usize>,

    /// HTTPリクエストのタイムアウト（秒）
    #[arg(long)]
    pub timeout: Option<u64>,

    /// SSL証明書の検証を無効にする（自己責任）
    #[arg(long)]
    pub insecure: bool,

    /// Scope-of-Work カスタムフィールドのid上書き
    #[arg(long)]
    pub sow_field_id: Option<String>,

    /// 抽出開始日（YYYY-MM-DD、省略時は当月初日）
    #[arg(long)]
    pub start_date: Option<String>,

    /// 抽出終了日（YYYY-MM-DD、この日を含む。省略時は今日）
    #[arg(long)]
    pub end_date: Option<String>,
}
