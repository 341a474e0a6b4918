use super::Issue;
use serde::{Deserialize, Serialize};

/// 検索エンドポイント（`/rest/api/3/search/jql`）へのリクエストボディ。
#[derive(Debug, Clone, Serialize, Default)]
pub struct SearchRequest {
    pub jql: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,

    #[serde(rename = "maxResults")]
    pub max_results: u32,

    #[serde(rename = "nextPageToken")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

impl SearchRequest {
    pub fn new(jql: impl Into<String>) -> Self {
        Self {
            jql: jql.into(),
            fields: Vec::new(),
            max_results: 100,
            next_page_token: None,
        }
    }

    pub fn fields(mut self, fields: Vec<String>) -> Self {
        self.fields = fields;
        self
    }

    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn next_page_token(mut self, token: Option<String>) -> Self {
        self.next_page_token = token;
        self
    }
}

/// 検索エンドポイントの1ページ分のレスポンス。
/// `next_page_token` が `None` になったら最終ページ。
#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<Issue>,

    #[serde(rename = "nextPageToken")]
    #[serde(default)]
    pub next_page_token: Option<String>,
}
