use serde::{Deserialize, Serialize};

/// フィールドカタログ（`/rest/api/3/field`）の1エントリ。
/// Scope-of-Work カスタムフィールドの存在確認にのみ使う。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_deserialization() {
        // Given: カスタムフィールドのカタログエントリ
        let json_data = json!({
            "id": "customfield_10100",
            "name": "Scope of Work",
            "custom": true
        });

        // When: デシリアライズ
        let field: Field = serde_json::from_value(json_data).unwrap();

        // Then: idと名前が取れる
        assert_eq!(field.id, "customfield_10100");
        assert_eq!(field.name, "Scope of Work");
        assert_eq!(field.custom, Some(true));
    }

    #[test]
    fn test_field_tolerates_minimal_entry() {
        // Given: idだけのエントリ
        let field: Field = serde_json::from_value(json!({"id": "summary"})).unwrap();

        // Then: 他フィールドはデフォルトで埋まる
        assert_eq!(field.id, "summary");
        assert_eq!(field.name, "");
        assert!(field.custom.is_none());
    }
}
