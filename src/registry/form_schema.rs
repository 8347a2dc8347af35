// ========================================
// 設定フォームのスキーマ
// ========================================
//
// セクション設定の編集フォームは FieldSpec の列から自動生成する。
// to_json_schema はフォームライブラリ向けの JSON Schema を出力し、
// validate は保存前の検証に使う。

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value, json};
use std::fmt;

use crate::model::section::SectionType;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Markdown,
    Number,
    Bool,
    Url,
    Select(&'static [&'static str]),
    Json,
    List,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// セクションJSON内のドット区切りパス
    pub path: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn required(path: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { path, label, kind, required: true }
    }

    pub fn optional(path: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self { path, label, kind, required: false }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    pub section_type: SectionType,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormError {
    Missing { path: String },
    WrongType { path: String, expected: &'static str },
    InvalidOption { path: String, value: String },
    InvalidUrl { path: String, value: String },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::Missing { path } => write!(f, "'{}' is required", path),
            FormError::WrongType { path, expected } => write!(f, "'{}' must be {}", path, expected),
            FormError::InvalidOption { path, value } => write!(f, "'{}' is not a valid option for '{}'", value, path),
            FormError::InvalidUrl { path, value } => write!(f, "'{}' is not a valid link for '{}'", value, path),
        }
    }
}

impl std::error::Error for FormError {}

lazy_static! {
    static ref LINK: Regex = Regex::new(r"^(https?://[^\s]+|/[^\s]*)$").expect("valid link regex");
}

/// ドット区切りパスで値を取り出す
pub fn value_at<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |node, key| node.get(key))
}

fn json_type(kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Text | FieldKind::Markdown => json!({ "type": "string" }),
        FieldKind::Url => json!({ "type": "string", "format": "uri" }),
        FieldKind::Number => json!({ "type": "number" }),
        FieldKind::Bool => json!({ "type": "boolean" }),
        FieldKind::Select(options) => json!({ "type": "string", "enum": options }),
        FieldKind::Json => json!({ "type": "object" }),
        FieldKind::List => json!({ "type": "array" }),
    }
}

impl FormSchema {
    /// ネストしたオブジェクトとして JSON Schema を生成
    pub fn to_json_schema(&self) -> Value {
        let mut root = Map::new();
        root.insert("type".into(), json!("object"));
        root.insert("title".into(), json!(self.section_type.info().title));
        root.insert("properties".into(), Value::Object(Map::new()));
        let mut root = Value::Object(root);

        for field in &self.fields {
            let segments: Vec<&str> = field.path.split('.').collect();
            let mut node = &mut root;
            for (depth, segment) in segments.iter().enumerate() {
                let last = depth + 1 == segments.len();
                if field.required {
                    push_required(node, segment);
                }
                let properties = node
                    .as_object_mut()
                    .and_then(|o| {
                        o.entry("properties")
                            .or_insert_with(|| Value::Object(Map::new()))
                            .as_object_mut()
                    });
                let Some(properties) = properties else { break };
                let entry = properties.entry(segment.to_string()).or_insert_with(|| {
                    if last {
                        Value::Null
                    } else {
                        json!({ "type": "object", "properties": {} })
                    }
                });
                if last {
                    let mut prop = json_type(&field.kind);
                    prop["title"] = json!(field.label);
                    *entry = prop;
                }
                node = entry;
            }
        }
        root
    }

    /// セクションJSONを検証する
    pub fn validate(&self, section: &Value) -> Result<(), Vec<FormError>> {
        let mut errors = Vec::new();
        for field in &self.fields {
            let path = field.path.to_string();
            let value = value_at(section, field.path).filter(|v| !v.is_null());
            let Some(value) = value else {
                if field.required {
                    errors.push(FormError::Missing { path });
                }
                continue;
            };

            let blank = match value {
                Value::String(s) => s.trim().is_empty(),
                Value::Array(a) => a.is_empty(),
                _ => false,
            };
            if blank {
                if field.required {
                    errors.push(FormError::Missing { path });
                }
                continue;
            }

            match (&field.kind, value) {
                (FieldKind::Text | FieldKind::Markdown, Value::String(_)) => {}
                (FieldKind::Number, Value::Number(_)) => {}
                (FieldKind::Bool, Value::Bool(_)) => {}
                (FieldKind::Json, Value::Object(_)) => {}
                (FieldKind::List, Value::Array(_)) => {}
                (FieldKind::Url, Value::String(s)) => {
                    if !LINK.is_match(s) {
                        errors.push(FormError::InvalidUrl { path, value: s.clone() });
                    }
                }
                (FieldKind::Select(options), Value::String(s)) => {
                    if !options.contains(&s.as_str()) {
                        errors.push(FormError::InvalidOption { path, value: s.clone() });
                    }
                }
                (kind, _) => errors.push(FormError::WrongType {
                    path,
                    expected: expected_name(kind),
                }),
            }
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn push_required(node: &mut Value, key: &str) {
    if let Some(obj) = node.as_object_mut() {
        let required = obj.entry("required").or_insert_with(|| json!([]));
        if let Some(list) = required.as_array_mut() {
            if !list.iter().any(|v| v == key) {
                list.push(json!(key));
            }
        }
    }
}

fn expected_name(kind: &FieldKind) -> &'static str {
    match kind {
        FieldKind::Text | FieldKind::Markdown | FieldKind::Url | FieldKind::Select(_) => "a string",
        FieldKind::Number => "a number",
        FieldKind::Bool => "a boolean",
        FieldKind::Json => "an object",
        FieldKind::List => "a list",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_at_nested_path() {
        let v = json!({ "config": { "defaultChainId": 1 } });
        assert_eq!(value_at(&v, "config.defaultChainId"), Some(&json!(1)));
        assert_eq!(value_at(&v, "config.missing"), None);
    }

    #[test]
    fn test_json_schema_nests_paths() {
        let schema = SectionType::Collection.form_schema().to_json_schema();
        assert_eq!(schema["properties"]["config"]["properties"]["address"]["type"], json!("string"));
        assert_eq!(schema["required"], json!(["config"]));
        assert_eq!(schema["properties"]["config"]["required"], json!(["network", "address"]));
        assert_eq!(schema["properties"]["hideMobile"]["type"], json!("boolean"));
    }

    #[test]
    fn test_validate_reports_missing_and_wrong_types() {
        let schema = SectionType::Video.form_schema();
        let errors = schema
            .validate(&json!({ "type": "video", "embedType": "tiktok", "hideMobile": "yes" }))
            .unwrap_err();
        assert!(errors.contains(&FormError::Missing { path: "videoUrl".into() }));
        assert!(errors.contains(&FormError::InvalidOption { path: "embedType".into(), value: "tiktok".into() }));
        assert!(errors.contains(&FormError::WrongType { path: "hideMobile".into(), expected: "a boolean" }));
    }

    #[test]
    fn test_validate_accepts_blank_swap() {
        let schema = SectionType::Swap.form_schema();
        assert_eq!(schema.validate(&json!({ "type": "swap", "config": {} })), Ok(()));
    }

    #[test]
    fn test_url_fields_accept_relative_and_absolute_links() {
        let schema = SectionType::Video.form_schema();
        assert!(schema.validate(&json!({ "videoUrl": "https://youtu.be/abcdefg" })).is_ok());
        let errors = schema.validate(&json!({ "videoUrl": "not a link" })).unwrap_err();
        assert!(matches!(errors[0], FormError::InvalidUrl { .. }));
    }
}
