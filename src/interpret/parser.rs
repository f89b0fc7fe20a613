//! Parse an interpretation backend response into a field catalog.

use std::collections::HashSet;

use serde_json::Value;

use super::InterpretError;
use crate::fields::{FieldCatalog, FieldDescriptor};

/// Overlay the backend's JSON answer onto a copy of the input catalog.
///
/// Length and order of the result match the input by construction, which is
/// what the merge precondition downstream relies on. Ids the backend invents
/// are ignored with a warning; fields it stays silent on keep a null value
/// so the merge treats them as "no answer".
pub fn parse_interpretation_response(
    response: &str,
    catalog: &[FieldDescriptor],
) -> Result<FieldCatalog, InterpretError> {
    let json_str = extract_json_object(response)?;
    let answers: serde_json::Map<String, Value> = serde_json::from_str(&json_str)
        .map_err(|e| InterpretError::JsonParsing(e.to_string()))?;

    let known: HashSet<&str> = catalog.iter().map(|f| f.id.as_str()).collect();
    for id in answers.keys() {
        if !known.contains(id.as_str()) {
            tracing::warn!(field_id = %id, "Interpretation returned unknown field id, ignoring");
        }
    }

    Ok(catalog
        .iter()
        .map(|field| {
            let value = answers.get(&field.id).cloned().unwrap_or(Value::Null);
            FieldDescriptor {
                value,
                ..field.clone()
            }
        })
        .collect())
}

/// Pull the JSON object out of a model response: prefer a ```json fenced
/// block, fall back to the first brace-balanced object.
fn extract_json_object(response: &str) -> Result<String, InterpretError> {
    if let Some(fence_start) = response.find("```json") {
        let content_start = fence_start + 7;
        let content_end = response[content_start..].find("```").ok_or_else(|| {
            InterpretError::MalformedResponse("Unclosed JSON block".into())
        })?;
        return Ok(response[content_start..content_start + content_end]
            .trim()
            .to_string());
    }

    first_balanced_object(response)
        .ok_or_else(|| InterpretError::MalformedResponse("No JSON object found".into()))
}

/// Scan for the first `{...}` with balanced braces, respecting string
/// literals and escapes.
fn first_balanced_object(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(text[start..start + offset + 1].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldKind;
    use serde_json::json;

    fn catalog() -> Vec<FieldDescriptor> {
        ["chief_complaint", "va_od_uncorrected", "iop_od"]
            .iter()
            .map(|id| FieldDescriptor {
                id: id.to_string(),
                path: id.to_string(),
                kind: FieldKind::Text,
                label: id.to_string(),
                value: json!(""),
            })
            .collect()
    }

    #[test]
    fn fenced_json_block_parsed() {
        let response = r#"Here are the fields:

```json
{"chief_complaint": "blurry vision", "iop_od": 18}
```
"#;
        let result = parse_interpretation_response(response, &catalog()).unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].value, json!("blurry vision"));
        assert_eq!(result[1].value, Value::Null);
        assert_eq!(result[2].value, json!(18));
    }

    #[test]
    fn bare_object_with_surrounding_text_parsed() {
        let response = r#"My answer: {"va_od_uncorrected": "20/40"} hope that helps"#;
        let result = parse_interpretation_response(response, &catalog()).unwrap();
        assert_eq!(result[1].value, json!("20/40"));
    }

    #[test]
    fn order_and_length_match_input_catalog() {
        let response = r#"{"iop_od": 18, "chief_complaint": "halos"}"#;
        let input = catalog();
        let result = parse_interpretation_response(response, &input).unwrap();
        assert_eq!(result.len(), input.len());
        for (out, original) in result.iter().zip(&input) {
            assert_eq!(out.id, original.id);
        }
    }

    #[test]
    fn unknown_ids_ignored() {
        let response = r#"{"made_up_field": "x", "iop_od": 17}"#;
        let result = parse_interpretation_response(response, &catalog()).unwrap();
        assert_eq!(result[2].value, json!(17));
        assert!(result.iter().all(|f| f.id != "made_up_field"));
    }

    #[test]
    fn nested_braces_in_string_values_handled() {
        let response = r#"{"chief_complaint": "sees {floaters} and flashes"}"#;
        let result = parse_interpretation_response(response, &catalog()).unwrap();
        assert_eq!(result[0].value, json!("sees {floaters} and flashes"));
    }

    #[test]
    fn missing_json_is_malformed() {
        let result = parse_interpretation_response("no structure here", &catalog());
        assert!(matches!(result, Err(InterpretError::MalformedResponse(_))));
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let result = parse_interpretation_response("```json\n{broken}\n```", &catalog());
        assert!(matches!(result, Err(InterpretError::JsonParsing(_))));
    }
}
