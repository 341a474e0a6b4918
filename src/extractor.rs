use crate::client::{JiraClient, JiraConfig};
use crate::config::AppConfig;
use crate::error::Result;
use crate::models::Issue;
use crate::report::ReportRow;
use crate::window::DateWindow;
use crate::worklogs::fetch_worklogs_for_issue;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// 検索時に常に要求する軽量フィールド。Scope-of-Work は存在確認が通った場合のみ追加。
const BASE_FIELDS: [&str; 4] = ["summary", "project", "issuetype", "priority"];
const SEARCH_PAGE_SIZE: u32 = 100;

/// 課題1件分のタスク結果。失敗ポリシーを型で表す:
/// 1課題の失敗は警告付きスキップであって、実行全体を止めない。
#[derive(Debug)]
pub enum IssueOutcome {
    Rows(Vec<ReportRow>),
    Skipped { issue_key: String, reason: String },
}

/// 抽出処理の全体を1回実行する。
///
/// 期間決定 → JQL構築 → SoWフィールドの事前確認 → 課題検索 →
/// 課題ごとの作業ログ取得（同時実行数は `max_workers` で制限）→ 行の集約。
/// 行の順序は完了順で、レポート内容には影響しない。
pub async fn run_extraction(config: &AppConfig, now: DateTime<Utc>) -> Result<Vec<ReportRow>> {
    let window = DateWindow::resolve(now, &config.start_date, &config.end_date);
    let jql = window.jql();
    info!(
        start = %window.start.format("%Y-%m-%d"),
        end = %window.end.format("%Y-%m-%d"),
        %jql,
        "extraction window resolved"
    );

    let jira_config = config.jira_config()?;
    let client = JiraClient::new(jira_config.clone())?;

    let mut fields: Vec<String> = BASE_FIELDS.iter().map(|s| s.to_string()).collect();
    let sow_field_id = match client.field_exists(&config.sow_field_id).await {
        Ok(true) => {
            fields.push(config.sow_field_id.clone());
            Some(config.sow_field_id.clone())
        }
        Ok(false) => {
            warn!(field = %config.sow_field_id, "Scope-of-Work field not found, omitting it");
            None
        }
        // 接続・TLSレベルの失敗はこの後の検索も成功しないため致命的扱い
        Err(err) if err.is_connection_failure() => return Err(err),
        Err(err) => {
            warn!(error = %err, "field catalog check failed, omitting Scope-of-Work");
            None
        }
    };

    // 検索の失敗は設定・接続の問題なので実行全体を打ち切る
    let issues = client.search_issues(&jql, &fields, SEARCH_PAGE_SIZE).await?;
    info!(issues = issues.len(), "issues matched the worklog window");

    let semaphore = Arc::new(Semaphore::new(config.max_workers.max(1)));
    let mut tasks = JoinSet::new();
    for issue in issues {
        let semaphore = Arc::clone(&semaphore);
        let task_config = jira_config.clone();
        let sow_field_id = sow_field_id.clone();
        tasks.spawn(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return IssueOutcome::Skipped {
                        issue_key: issue.key,
                        reason: "worker pool closed".to_string(),
                    };
                }
            };
            fetch_issue_task(task_config, issue, window, sow_field_id).await
        });
    }

    let mut rows = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(IssueOutcome::Rows(mut batch)) => rows.append(&mut batch),
            Ok(IssueOutcome::Skipped { issue_key, reason }) => {
                warn!(issue = %issue_key, %reason, "issue skipped");
            }
            Err(join_err) => warn!(error = %join_err, "worklog task failed to join"),
        }
    }

    info!(rows = rows.len(), "extraction finished");
    Ok(rows)
}

/// 1課題分のタスク本体。タスクごとに独立したセッションを新規構築し、
/// あらゆる失敗を `Skipped` に畳み込んで兄弟タスクへ影響させない。
async fn fetch_issue_task(
    config: JiraConfig,
    issue: Issue,
    window: DateWindow,
    sow_field_id: Option<String>,
) -> IssueOutcome {
    let client = match JiraClient::new(config) {
        Ok(client) => client,
        Err(err) => {
            return IssueOutcome::Skipped {
                issue_key: issue.key,
                reason: err.to_string(),
            };
        }
    };

    match fetch_worklogs_for_issue(&client, &issue, &window, sow_field_id.as_deref()).await {
        Ok(rows) => IssueOutcome::Rows(rows),
        Err(err) => IssueOutcome::Skipped {
            issue_key: issue.key,
            reason: err.to_string(),
        },
    }
}
