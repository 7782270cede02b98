use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)```[A-Za-z0-9_+\-]*[ \t]*\r?\n(.*?)\r?\n?```").expect("static regex")
    })
}

/// 去掉 markdown 代码围栏；有多个围栏时取第一个
pub fn strip_code_fences(text: &str) -> String {
    match fence_re().captures(text) {
        Some(caps) => caps
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or("")
            .trim()
            .to_string(),
        None => text.trim().to_string(),
    }
}

/// 从模型输出中取出 JSON：先尝试整段，再尝试围栏内，最后取第一个 `{`/`[` 到最后一个 `}`/`]`
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(v) = serde_json::from_str::<Value>(trimmed) {
        return Some(v);
    }

    let unfenced = strip_code_fences(trimmed);
    if let Ok(v) = serde_json::from_str::<Value>(&unfenced) {
        return Some(v);
    }

    let start = unfenced.find(['{', '['])?;
    let end = unfenced.rfind(['}', ']'])?;
    if end <= start {
        return None;
    }
    serde_json::from_str::<Value>(&unfenced[start..=end]).ok()
}
