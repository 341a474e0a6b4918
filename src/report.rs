use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// レポート1行。1件の (課題, 作業ログ) の組から作られ、以後変更されない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Project")]
    pub project: String,
    #[serde(rename = "Issue Type")]
    pub issue_type: String,
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Summary")]
    pub summary: String,
    #[serde(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "SoW")]
    pub sow: String,
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Hours")]
    pub hours: f64,
    #[serde(rename = "Description")]
    pub description: String,
}

/// 出力された2つのレポートファイルのパス。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub full: PathBuf,
    pub short: PathBuf,
}

/// レポート出力の境界。抽出側はこのインターフェースだけを知る。
pub trait ReportWriter {
    /// 全カラム版と短縮版の2ファイルを書き出す。
    fn write_reports(&self, rows: &[ReportRow], out_path: &Path) -> Result<ReportPaths>;
}

/// CSV形式のレポートライター。
/// フルレポートは10カラム、短縮版は7カラムのサブセットを
/// `<ベース名>_short.csv` に書く。
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvReportWriter;

const SHORT_HEADERS: [&str; 7] = [
    "Project",
    "Key",
    "Summary",
    "SoW",
    "Start Date",
    "Author",
    "Hours",
];

impl ReportWriter for CsvReportWriter {
    fn write_reports(&self, rows: &[ReportRow], out_path: &Path) -> Result<ReportPaths> {
        let full = with_csv_extension(out_path);
        let short = short_report_path(&full);

        let mut writer = csv::Writer::from_path(&full)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        let mut short_writer = csv::Writer::from_path(&short)?;
        short_writer.write_record(SHORT_HEADERS)?;
        for row in rows {
            short_writer.write_record([
                row.project.as_str(),
                row.key.as_str(),
                row.summary.as_str(),
                row.sow.as_str(),
                row.start_date.as_str(),
                row.author.as_str(),
                &row.hours.to_string(),
            ])?;
        }
        short_writer.flush()?;

        info!(rows = rows.len(), full = %full.display(), short = %short.display(), "reports written");
        Ok(ReportPaths { full, short })
    }
}

/// 実行時刻入りのデフォルト出力ファイル名（`<prefix>-YYYY-MM-DD-HHMM.csv`）。
pub fn default_out_name(prefix: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}.csv", prefix, now.format("%Y-%m-%d-%H%M"))
}

fn with_csv_extension(path: &Path) -> PathBuf {
    match path.extension() {
        Some(_) => path.to_path_buf(),
        None => path.with_extension("csv"),
    }
}

/// 短縮版レポートのパス。拡張子の手前に `_short` を挟む。
pub fn short_report_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("csv");
    path.with_file_name(format!("{}_short.{}", stem, ext))
}
