//! Tagged field paths and get/set-at-path over nested record values.
//!
//! A path is a dot-separated list of object keys. Two composite forms
//! survive from the legacy field catalog layout:
//! - `diagnosis` carries an ordered list of strings but is presented as a
//!   single comma-separated text field, and
//! - an intraocular-pressure leaf is addressed with a trailing empty segment
//!   (`intraocularPressure.rightEye.`) and writes the eye key's scalar slot
//!   directly rather than a sub-object.

use serde_json::Value;

use super::FieldError;

/// How a parsed path reads and writes its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathForm {
    /// Plain object-key traversal.
    Plain,
    /// The diagnosis list, joined/split as comma-separated text.
    DiagnosisCsv,
    /// Trailing-dot legacy form: the final key holds a scalar, not an object.
    EyeScalar,
}

/// Parsed field path: ordered key segments plus the composite form tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<String>,
    form: PathForm,
}

impl FieldPath {
    /// Parse a dotted path. Rejects empty paths and empty interior segments;
    /// a single trailing empty segment selects the `EyeScalar` form.
    pub fn parse(raw: &str) -> Result<Self, FieldError> {
        if raw.is_empty() {
            return Err(FieldError::InvalidPath {
                path: raw.to_string(),
                reason: "empty path".into(),
            });
        }

        let mut segments: Vec<String> = raw.split('.').map(str::to_string).collect();

        let form = if segments.last().is_some_and(String::is_empty) {
            segments.pop();
            PathForm::EyeScalar
        } else if raw == "diagnosis" {
            PathForm::DiagnosisCsv
        } else {
            PathForm::Plain
        };

        if segments.is_empty() || segments.iter().any(String::is_empty) {
            return Err(FieldError::InvalidPath {
                path: raw.to_string(),
                reason: "empty path segment".into(),
            });
        }

        Ok(Self { segments, form })
    }

    pub fn form(&self) -> PathForm {
        self.form
    }

    /// Read the value at this path. Absent intermediates yield `Null`,
    /// never an error.
    pub fn get(&self, root: &Value) -> Value {
        let mut current = root;
        for segment in &self.segments {
            match current.get(segment) {
                Some(next) => current = next,
                None => return Value::Null,
            }
        }

        match self.form {
            PathForm::DiagnosisCsv => diagnosis_to_csv(current),
            PathForm::Plain | PathForm::EyeScalar => current.clone(),
        }
    }

    /// Write `value` at this path, creating missing intermediate objects.
    /// Descending into an existing non-object value is rejected: unknown
    /// shapes error instead of silently no-op-ing.
    pub fn set(&self, root: &mut Value, value: Value) -> Result<(), FieldError> {
        let (last, intermediate) = self
            .segments
            .split_last()
            .ok_or_else(|| FieldError::InvalidPath {
                path: self.segments.join("."),
                reason: "empty path".into(),
            })?;

        let mut current = root;
        for segment in intermediate {
            if current.is_null() {
                *current = Value::Object(serde_json::Map::new());
            }
            let map = current
                .as_object_mut()
                .ok_or_else(|| self.non_object_error(segment))?;
            current = map
                .entry(segment.clone())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
        }

        if current.is_null() {
            *current = Value::Object(serde_json::Map::new());
        }
        let map = current
            .as_object_mut()
            .ok_or_else(|| self.non_object_error(last))?;

        let written = match self.form {
            PathForm::DiagnosisCsv => csv_to_diagnosis(&value),
            PathForm::Plain | PathForm::EyeScalar => value,
        };
        map.insert(last.clone(), written);
        Ok(())
    }

    fn non_object_error(&self, segment: &str) -> FieldError {
        FieldError::InvalidPath {
            path: self.segments.join("."),
            reason: format!("segment '{segment}' addresses a non-object value"),
        }
    }
}

impl std::fmt::Display for FieldPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("."))?;
        if self.form == PathForm::EyeScalar {
            write!(f, ".")?;
        }
        Ok(())
    }
}

fn diagnosis_to_csv(value: &Value) -> Value {
    match value {
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            Value::String(joined)
        }
        other => other.clone(),
    }
}

fn csv_to_diagnosis(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::Array(
            s.split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(|entry| Value::String(entry.to_string()))
                .collect(),
        ),
        other => other.clone(),
    }
}
