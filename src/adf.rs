use serde_json::Value;

/// ADF（Atlassian Document Format）のドキュメントをプレーンテキストへ変換する。
///
/// 文字列はそのまま通し、オブジェクトはノード木を走査して行を組み立てる。
/// それ以外の入力は空文字列になる。
pub fn adf_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) => {
            let mut lines = Vec::new();
            collect_lines(value, &mut lines);
            lines
                .iter()
                .map(|line| line.trim_end())
                .collect::<Vec<_>>()
                .join("\n")
                .trim()
                .to_string()
        }
        _ => String::new(),
    }
}

/// ノード木を走査して出力行を集める。
///
/// - `paragraph` / `heading` / `blockquote` はテキスト葉を連結した1行を出力
///   （`hardBreak` は行内の改行になる）
/// - リストコンテナは各 `listItem` の出力行に `"- "` を前置
/// - 未知のノード種別は行を出力せず子へ再帰する（前方互換のための受け皿）
fn collect_lines(node: &Value, out: &mut Vec<String>) {
    let Some(obj) = node.as_object() else {
        return;
    };
    let node_type = obj.get("type").and_then(Value::as_str).unwrap_or("");
    let children: &[Value] = obj
        .get("content")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    match node_type {
        "paragraph" | "heading" | "blockquote" => out.push(inline_text(children)),
        "bulletList" | "orderedList" => {
            for item in children {
                let mut item_lines = Vec::new();
                collect_lines(item, &mut item_lines);
                out.extend(item_lines.into_iter().map(|line| format!("- {line}")));
            }
        }
        _ => {
            for child in children {
                collect_lines(child, out);
            }
        }
    }
}

/// インラインノード列を1行のテキストへ連結する。
fn inline_text(children: &[Value]) -> String {
    let mut line = String::new();
    for child in children {
        let node_type = child.get("type").and_then(Value::as_str).unwrap_or("");
        match node_type {
            "text" => {
                if let Some(text) = child.get("text").and_then(Value::as_str) {
                    line.push_str(text);
                }
            }
            "hardBreak" => line.push('\n'),
            _ => {
                // 未知のインラインノードは内部のテキスト葉だけ拾う
                if let Some(nested) = child.get("content").and_then(Value::as_array) {
                    line.push_str(&inline_text(nested));
                }
            }
        }
    }
    line
}

/// 階層ノードから表示用ラベルを取り出す。
/// `value` / `name` / `label` / `title` / `key` を順に試し、
/// 最後に `id` の文字列化へフォールバックする。
pub fn best_label(value: &Value) -> String {
    let Some(obj) = value.as_object() else {
        return String::new();
    };
    for key in ["value", "name", "label", "title", "key"] {
        match obj.get(key) {
            Some(Value::String(s)) => return s.clone(),
            Some(Value::Number(n)) => return n.to_string(),
            _ => {}
        }
    }
    match obj.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// 階層フィールドを祖先→子孫の順のラベル列へ平坦化する。
/// `child` リンク、なければ `children` リストの先頭要素をたどる。
pub fn flatten_hierarchy(value: &Value) -> Vec<String> {
    let mut labels = Vec::new();
    let mut current = value;
    loop {
        labels.push(best_label(current));
        let next = match current.get("child") {
            Some(child) if child.is_object() => Some(child),
            _ => current
                .get("children")
                .and_then(Value::as_array)
                .and_then(|children| children.first()),
        };
        match next {
            Some(node) => current = node,
            None => break,
        }
    }
    labels
}

/// Scope-of-Work フィールド値を形状（文字列・リスト・階層ノード）に応じて
/// 1つの文字列へ落とす。
pub fn stringify_sow(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(stringify_sow)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | "),
        Value::Object(_) => flatten_hierarchy(value).join(":"),
        other => other.to_string(),
    }
}

/// 文字列中で最初に現れる連続した10進数字列を返す。なければ空文字列。
pub fn numeric_only(s: &str) -> String {
    let mut digits = String::new();
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
        } else if !digits.is_empty() {
            break;
        }
    }
    digits
}

/// SoW フィールド値をレポート用の数値コードへ縮約する。
/// 複数要素（`" | "` 区切り）の場合は要素ごとに数値抽出して残ったものを再結合する。
pub fn sow_code(value: Option<&Value>) -> String {
    let text = value.map(stringify_sow).unwrap_or_default();
    if text.contains(" | ") {
        text.split(" | ")
            .map(numeric_only)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" | ")
    } else {
        numeric_only(&text)
    }
}
