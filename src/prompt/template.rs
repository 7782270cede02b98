use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TemplateError {
    #[error("missing value for placeholder '{0}'")]
    MissingVariable(String),
    #[error("single '{brace}' encountered in template at byte {pos}")]
    UnmatchedBrace { brace: char, pos: usize },
    #[error("invalid placeholder '{{{0}}}'")]
    InvalidField(String),
}

#[derive(Clone, Debug, PartialEq)]
enum Segment {
    Text(String),
    Var(String),
}

/// `{name}` 占位符模板；`{{` / `}}` 转义为字面量花括号
#[derive(Clone, Debug)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{|\}\}|\{([^{}]*)\}|[{}]").expect("static regex"))
}

fn field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static regex"))
}

impl PromptTemplate {
    pub fn parse(source: impl Into<String>) -> Result<Self, TemplateError> {
        let source = source.into();
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut last = 0;

        for caps in token_re().captures_iter(&source) {
            let m = caps.get(0).expect("group 0");
            text.push_str(&source[last..m.start()]);
            last = m.end();
            match m.as_str() {
                "{{" => text.push('{'),
                "}}" => text.push('}'),
                "{" | "}" => {
                    return Err(TemplateError::UnmatchedBrace {
                        brace: m.as_str().chars().next().unwrap_or('{'),
                        pos: m.start(),
                    })
                }
                _ => {
                    let name = caps.get(1).map_or("", |g| g.as_str());
                    if !field_re().is_match(name) {
                        return Err(TemplateError::InvalidField(name.to_string()));
                    }
                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Var(name.to_string()));
                }
            }
        }
        text.push_str(&source[last..]);
        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        Ok(Self { source, segments })
    }

    /// 按首次出现顺序去重
    pub fn input_variables(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for seg in &self.segments {
            if let Segment::Var(name) = seg {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
        }
        out
    }

    pub fn fill<K, V>(&self, values: &HashMap<K, V>) -> Result<String, TemplateError>
    where
        K: std::borrow::Borrow<str> + std::hash::Hash + Eq,
        V: AsRef<str>,
    {
        let mut out = String::with_capacity(self.source.len());
        for seg in &self.segments {
            match seg {
                Segment::Text(t) => out.push_str(t),
                Segment::Var(name) => {
                    let v = values
                        .get(name.as_str())
                        .ok_or_else(|| TemplateError::MissingVariable(name.clone()))?;
                    out.push_str(v.as_ref());
                }
            }
        }
        Ok(out)
    }

    pub fn fill_pairs(&self, pairs: &[(&str, &str)]) -> Result<String, TemplateError> {
        let values: HashMap<&str, &str> = pairs.iter().copied().collect();
        self.fill(&values)
    }
}

/// 一次性解析并填充
pub fn fill_template(template: &str, pairs: &[(&str, &str)]) -> Result<String, TemplateError> {
    PromptTemplate::parse(template)?.fill_pairs(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSLATE: &str =
        "Translate the following {source_language} sentence to {target_language}: {sentence}";

    #[test]
    fn fills_translation_template() {
        let out = fill_template(
            TRANSLATE,
            &[
                ("source_language", "English"),
                ("target_language", "Spanish"),
                ("sentence", "How are you?"),
            ],
        )
        .unwrap();
        assert_eq!(
            out,
            "Translate the following English sentence to Spanish: How are you?"
        );
    }

    #[test]
    fn missing_value_is_an_error() {
        let err = fill_template(TRANSLATE, &[("source_language", "English")]).unwrap_err();
        assert_eq!(
            err,
            TemplateError::MissingVariable("target_language".to_string())
        );
    }

    #[test]
    fn extra_values_are_ignored_and_repeats_filled() {
        let out = fill_template("{a}-{b}-{a}", &[("a", "x"), ("b", "y"), ("c", "z")]).unwrap();
        assert_eq!(out, "x-y-x");
    }

    #[test]
    fn escaped_braces_become_literals() {
        let t = PromptTemplate::parse(r#"{{"file_path": "{path}"}}"#).unwrap();
        assert_eq!(t.input_variables(), vec!["path"]);
        assert_eq!(
            t.fill_pairs(&[("path", "data/a.json")]).unwrap(),
            r#"{"file_path": "data/a.json"}"#
        );
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        let src = "Please provide a concise summary.\n\n  Summary:\n";
        let t = PromptTemplate::parse(src).unwrap();
        assert!(t.input_variables().is_empty());
        assert_eq!(t.fill_pairs(&[]).unwrap(), src);
    }

    #[test]
    fn stray_brace_is_rejected() {
        assert_eq!(
            PromptTemplate::parse("oops } here").unwrap_err(),
            TemplateError::UnmatchedBrace { brace: '}', pos: 5 }
        );
        assert!(matches!(
            PromptTemplate::parse("open { never closed").unwrap_err(),
            TemplateError::UnmatchedBrace { brace: '{', .. }
        ));
    }

    #[test]
    fn positional_and_odd_fields_are_rejected() {
        assert_eq!(
            PromptTemplate::parse("{}").unwrap_err(),
            TemplateError::InvalidField(String::new())
        );
        assert_eq!(
            PromptTemplate::parse("{0}").unwrap_err(),
            TemplateError::InvalidField("0".into())
        );
        assert_eq!(
            PromptTemplate::parse("{ name }").unwrap_err(),
            TemplateError::InvalidField(" name ".into())
        );
    }

    #[test]
    fn input_variables_keep_first_occurrence_order() {
        let t = PromptTemplate::parse(TRANSLATE).unwrap();
        assert_eq!(
            t.input_variables(),
            vec!["source_language", "target_language", "sentence"]
        );
    }
}
