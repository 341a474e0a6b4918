use crate::adf::{adf_to_text, sow_code};
use crate::client::JiraClient;
use crate::error::Result;
use crate::models::Issue;
use crate::report::ReportRow;
use crate::window::DateWindow;
use chrono::{DateTime, Utc};
use tracing::debug;

const WORKLOG_PAGE_SIZE: u32 = 100;

/// 作業ログの `started` タイムスタンプをパースする。
/// RFC 3339 形式と、Jiraが返す固定オフセット形式（`+0000`）の両方を受け付ける。
/// パースできないものは `None`（呼び出し側でそのエントリを黙ってスキップする）。
pub fn parse_started(started: &str) -> Option<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(started)
        .or_else(|_| DateTime::parse_from_str(started, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()?;
    Some(parsed.with_timezone(&Utc))
}

/// 秒数を時間へ換算し小数第2位へ丸める。
pub fn hours_spent(seconds: i64) -> f64 {
    (seconds as f64 / 3600.0 * 100.0).round() / 100.0
}

/// 1課題分の作業ログを全ページ取得し、期間内のエントリをレポート行へ射影する。
///
/// Scope-of-Work コードは課題ごとに1回だけ計算する（エントリごとではない）。
/// ページ取得のHTTPエラーは `Err` として呼び出し側（オーケストレーター）へ
/// 伝播し、その課題全体のスキップになる。
pub async fn fetch_worklogs_for_issue(
    client: &JiraClient,
    issue: &Issue,
    window: &DateWindow,
    sow_field_id: Option<&str>,
) -> Result<Vec<ReportRow>> {
    let sow = match sow_field_id {
        Some(field_id) => sow_code(issue.fields.custom_fields.get(field_id)),
        None => String::new(),
    };

    let mut rows = Vec::new();
    let mut start_at: u32 = 0;
    loop {
        let page = client
            .worklog_page(&issue.key, start_at, WORKLOG_PAGE_SIZE)
            .await?;
        if page.worklogs.is_empty() {
            break;
        }
        let fetched = page.worklogs.len() as u32;

        for entry in &page.worklogs {
            let Some(started) = entry.started.as_deref().and_then(parse_started) else {
                continue;
            };
            if !window.contains(started) {
                continue;
            }

            rows.push(ReportRow {
                project: issue.fields.project_name().to_string(),
                issue_type: issue.fields.issue_type_name().to_string(),
                key: issue.key.clone(),
                summary: issue.fields.summary_text().to_string(),
                priority: issue.fields.priority_name().to_string(),
                sow: sow.clone(),
                start_date: started.format("%Y-%m-%d").to_string(),
                author: entry.author_display_name().to_string(),
                hours: hours_spent(entry.time_spent_seconds),
                description: entry
                    .comment
                    .as_ref()
                    .map(adf_to_text)
                    .unwrap_or_default(),
            });
        }

        start_at += fetched;
        if start_at >= page.total {
            break;
        }
    }

    debug!(issue = %issue.key, rows = rows.len(), "worklogs fetched");
    Ok(rows)
}
