use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 課題の作業ログエンドポイントの1ページ分のレスポンス。
#[derive(Debug, Clone, Deserialize)]
pub struct WorklogPage {
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
    #[serde(default)]
    pub total: u32,
}

/// 1件の作業ログエントリ。`comment` はプレーン文字列またはADFドキュメント。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worklog {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<WorklogAuthor>,

    #[serde(rename = "timeSpentSeconds")]
    #[serde(default)]
    pub time_spent_seconds: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<Value>,
}

impl Worklog {
    pub fn author_display_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.display_name.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorklogAuthor {
    #[serde(rename = "displayName")]
    #[serde(default)]
    pub display_name: String,
}
