//! Flat field catalog: the interchange format between a nested clinical
//! record and the free-text interpretation capability.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared input type of a field, as the legacy form layout knew it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Number,
    Textarea,
    Select,
}

/// Static catalog entry: where a field lives and how it is presented.
#[derive(Debug, Clone)]
pub struct FieldTemplate {
    pub id: &'static str,
    pub path: &'static str,
    pub kind: FieldKind,
    pub label: &'static str,
}

/// One addressable leaf of a nested record, with its current value.
/// Transient, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub id: String,
    pub path: String,
    pub kind: FieldKind,
    pub label: String,
    pub value: Value,
}

impl FieldDescriptor {
    pub fn from_template(template: &FieldTemplate, value: Value) -> Self {
        Self {
            id: template.id.to_string(),
            path: template.path.to_string(),
            kind: template.kind,
            label: template.label.to_string(),
            value,
        }
    }
}

/// Ordered list of field descriptors, one per addressable leaf of interest.
pub type FieldCatalog = Vec<FieldDescriptor>;

/// Emptiness predicate for catalog values: null, blank-after-trim string,
/// empty list, or an object whose every leaf is itself empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.values().all(is_empty_value),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Render a catalog value as comparison text, trimmed.
///
/// Comparison is by rendered string, not structural equality: candidate
/// values arrive with potentially different primitive types than the
/// original (numeric string vs. number).
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items
            .iter()
            .map(stringify_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => map
            .values()
            .map(stringify_value)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
    }
}
