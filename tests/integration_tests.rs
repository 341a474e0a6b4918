//! 抽出パイプライン各段の統合テスト。
//!
//! 実際のJira Cloudは使わず、wiremockで検索・フィールドカタログ・
//! 作業ログの各エンドポイントを再現する。

use chrono::{TimeZone, Utc};
use jira_worklog_extractor::{
    Auth, DateWindow, Issue, JiraClient, JiraConfig, RetryPolicy, fetch_worklogs_for_issue,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// モックサーバー向けのクライアントを作成するヘルパー関数
fn mock_client(mock_server: &MockServer) -> JiraClient {
    let config = JiraConfig::new(
        mock_server.uri(),
        Auth::Basic {
            email: "test@example.com".to_string(),
            api_token: "mock-api-token".to_string(),
        },
    )
    .unwrap()
    .retry(RetryPolicy {
        max_tries: 2,
        backoff_base: 0.0,
    });
    JiraClient::new(config).unwrap()
}

fn test_window() -> DateWindow {
    DateWindow {
        start: Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap(),
        end: Utc.with_ymd_and_hms(2025, 10, 25, 0, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_search_issues_paginates_with_continuation_token() {
    // Given: 継続トークンで2ページに分かれた検索結果
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/3/search/jql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [{"key": "TEST-1", "fields": {"summary": "First"}}],
            "nextPageToken": "nxt"
        })))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/api/3/search/jql"))
        .and(body_partial_json(json!({"nextPageToken": "nxt"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [{"key": "TEST-2", "fields": {"summary": "Second"}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);

    // When: 検索を完了まで実行
    let issues = client
        .search_issues("project = TEST", &["summary".to_string()], 100)
        .await
        .unwrap();

    // Then: 両ページの課題が順に集まる
    let keys: Vec<&str> = issues.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, vec!["TEST-1", "TEST-2"]);
}

#[tokio::test]
async fn test_search_issues_stops_on_empty_page_despite_token() {
    // Given: トークン付きだが課題ゼロのページ（古いトークンの再現）
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/3/search/jql"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "issues": [],
            "nextPageToken": "stale"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);

    // When: 検索を実行
    let issues = client
        .search_issues("project = TEST", &["summary".to_string()], 100)
        .await
        .unwrap();

    // Then: 無限ループせず1回で打ち切る
    assert!(issues.is_empty());
}

#[tokio::test]
async fn test_search_issues_http_error_is_fatal() {
    // Given: 400を返す検索エンドポイント
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/3/search/jql"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad jql"))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);

    // When: 検索を実行
    let result = client
        .search_issues("bad", &["summary".to_string()], 100)
        .await;

    // Then: 実行全体を止めるエラー（終了コード3相当）
    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 3);
}

#[tokio::test]
async fn test_fetch_worklogs_filters_and_projects_rows() {
    // Given: 期間内2件・期間外1件の作業ログを持つ課題
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/TEST-1/worklog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "worklogs": [
                {
                    "started": "2025-10-10T10:00:00.000+0000",
                    "author": {"displayName": "Dev A"},
                    "timeSpentSeconds": 7200,
                    "comment": {
                        "type": "doc",
                        "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Worked"}]}]
                    }
                },
                {
                    "started": "2025-09-30T23:59:59.000+0000",
                    "author": {"displayName": "Dev B"},
                    "timeSpentSeconds": 3600,
                    "comment": "Should be filtered out"
                },
                {
                    "started": "2025-10-24T08:30:00.000+0000",
                    "author": {"displayName": "Dev C"},
                    "timeSpentSeconds": 1800,
                    "comment": "Note"
                }
            ],
            "total": 3
        })))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let issue: Issue = serde_json::from_value(json!({
        "key": "TEST-1",
        "fields": {
            "summary": "Sum",
            "project": {"name": "Proj"},
            "issuetype": {"name": "Bug"},
            "priority": {"name": "High"},
            "customfield_10100": "SOW ABC123"
        }
    }))
    .unwrap();

    // When: 課題1件分を取得
    let rows = fetch_worklogs_for_issue(&client, &issue, &test_window(), Some("customfield_10100"))
        .await
        .unwrap();

    // Then: 期間内の2件だけが行になる
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(first.project, "Proj");
    assert_eq!(first.issue_type, "Bug");
    assert_eq!(first.key, "TEST-1");
    assert_eq!(first.summary, "Sum");
    assert_eq!(first.priority, "High");
    assert_eq!(first.sow, "123");
    assert_eq!(first.start_date, "2025-10-10");
    assert_eq!(first.author, "Dev A");
    assert_eq!(first.hours, 2.0);
    assert!(first.description.contains("Worked"));

    let second = &rows[1];
    assert_eq!(second.author, "Dev C");
    assert_eq!(second.hours, 0.5);
    assert_eq!(second.start_date, "2025-10-24");
    assert_eq!(second.description, "Note");
}

#[tokio::test]
async fn test_fetch_worklogs_paginates_until_total() {
    // Given: totalが2で1件ずつ返る2ページ
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/KEY-1/worklog"))
        .and(query_param("startAt", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "worklogs": [{
                "started": "2025-10-10T10:00:00.000+0000",
                "author": {"displayName": "Dev1"},
                "timeSpentSeconds": 1800,
                "comment": "C1"
            }],
            "total": 2
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/KEY-1/worklog"))
        .and(query_param("startAt", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "worklogs": [{
                "started": "2025-10-11T12:00:00.000+0000",
                "author": {"displayName": "Dev2"},
                "timeSpentSeconds": 3600,
                "comment": "C2"
            }],
            "total": 2
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let issue: Issue =
        serde_json::from_value(json!({"key": "KEY-1", "fields": {"summary": "S"}})).unwrap();

    // When: 課題1件分を取得
    let rows = fetch_worklogs_for_issue(&client, &issue, &test_window(), None)
        .await
        .unwrap();

    // Then: 両ページの作業ログが集まり、totalに達した時点で止まる
    assert_eq!(rows.len(), 2);
    let authors: Vec<&str> = rows.iter().map(|r| r.author.as_str()).collect();
    assert!(authors.contains(&"Dev1"));
    assert!(authors.contains(&"Dev2"));
}

#[tokio::test]
async fn test_fetch_worklogs_page_error_propagates() {
    // Given: 作業ログページが常に500を返す（リトライ後も失敗）
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/KEY-1/worklog"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let issue: Issue =
        serde_json::from_value(json!({"key": "KEY-1", "fields": {}})).unwrap();

    // When: 課題1件分を取得
    let result = fetch_worklogs_for_issue(&client, &issue, &test_window(), None).await;

    // Then: エラーとして呼び出し側へ伝播する（その課題はスキップ対象）
    assert!(result.is_err());
}

#[tokio::test]
async fn test_fetch_worklogs_unparseable_timestamps_skipped_silently() {
    // Given: タイムスタンプ欠損・不正・正常の3件
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/3/issue/KEY-1/worklog"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "worklogs": [
                {"author": {"displayName": "NoStart"}, "timeSpentSeconds": 600},
                {"started": "garbage", "author": {"displayName": "Bad"}, "timeSpentSeconds": 600},
                {
                    "started": "2025-10-10T10:00:00.000+0000",
                    "author": {"displayName": "Good"},
                    "timeSpentSeconds": 600
                }
            ],
            "total": 3
        })))
        .mount(&mock_server)
        .await;

    let client = mock_client(&mock_server);
    let issue: Issue =
        serde_json::from_value(json!({"key": "KEY-1", "fields": {}})).unwrap();

    // When: 課題1件分を取得
    let rows = fetch_worklogs_for_issue(&client, &issue, &test_window(), None)
        .await
        .unwrap();

    // Then: パースできた1件だけが行になり、コメントなしは空文字列
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].author, "Good");
    assert_eq!(rows[0].description, "");
    assert_eq!(rows[0].sow, "");
}
