use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// 検索結果に含まれる課題。レポートに必要な軽量フィールドのみ保持する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<NamedField>,
    #[serde(rename = "issuetype")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<NamedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<NamedField>,

    // カスタムフィールド（Scope-of-Work を含む）は動的に追加される
    #[serde(flatten)]
    pub custom_fields: HashMap<String, Value>,
}

impl IssueFields {
    pub fn summary_text(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }

    pub fn project_name(&self) -> &str {
        self.project.as_ref().map(|f| f.name.as_str()).unwrap_or("")
    }

    pub fn issue_type_name(&self) -> &str {
        self.issue_type
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or("")
    }

    pub fn priority_name(&self) -> &str {
        self.priority
            .as_ref()
            .map(|f| f.name.as_str())
            .unwrap_or("")
    }
}

/// 名前だけ参照するJiraエンティティ（プロジェクト・課題タイプ・優先度）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedField {
    #[serde(default)]
    pub name: String,
}
