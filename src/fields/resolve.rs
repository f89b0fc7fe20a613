//! Flatten/unflatten between a typed nested record and its field catalog.
//!
//! Both directions work over the record's `serde_json::Value` form so the
//! same path walker serves every record shape; the final typed
//! deserialization in `unflatten` is what rejects values that do not fit
//! the record.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::catalog::{is_empty_value, FieldCatalog, FieldDescriptor, FieldKind, FieldTemplate};
use super::path::FieldPath;
use super::FieldError;

/// Read the current value of every template field out of `record`.
/// Absent intermediates read as null, never as an error.
pub fn flatten<T: Serialize>(
    record: &T,
    template: &[FieldTemplate],
) -> Result<FieldCatalog, FieldError> {
    let root = serde_json::to_value(record)
        .map_err(|e| FieldError::Serialization(e.to_string()))?;

    template
        .iter()
        .map(|entry| {
            let path = FieldPath::parse(entry.path)?;
            Ok(FieldDescriptor::from_template(entry, path.get(&root)))
        })
        .collect()
}

/// Write every present, non-empty catalog value into a copy of `base`.
///
/// Empty values are skipped entirely; unflatten never deletes or nulls
/// existing data. Applying the same catalog twice yields the same record.
pub fn unflatten<T: Serialize + DeserializeOwned>(
    catalog: &[FieldDescriptor],
    base: &T,
) -> Result<T, FieldError> {
    let mut root = serde_json::to_value(base)
        .map_err(|e| FieldError::Serialization(e.to_string()))?;

    for descriptor in catalog {
        if is_empty_value(&descriptor.value) {
            continue;
        }
        let path = FieldPath::parse(&descriptor.path)?;
        let value = coerce_for_kind(descriptor.kind, descriptor.value.clone());
        path.set(&mut root, value)?;
    }

    serde_json::from_value(root).map_err(|e| FieldError::Serialization(e.to_string()))
}

/// Interpretation results carry numbers as strings often enough that
/// number-kind fields parse string digits back into JSON numbers before the
/// typed deserialization sees them.
fn coerce_for_kind(kind: FieldKind, value: Value) -> Value {
    match (kind, &value) {
        (FieldKind::Number, Value::String(s)) => match s.trim().parse::<f64>() {
            Ok(n) => serde_json::Number::from_f64(n)
                .map(Value::Number)
                .unwrap_or(value),
            Err(_) => value,
        },
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::template::examination_field_template;
    use crate::models::Examination;
    use chrono::NaiveDate;
    use serde_json::json;
    use uuid::Uuid;

    fn exam() -> Examination {
        let mut exam = Examination::draft(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            None,
        );
        exam.chief_complaint = "blurry vision".into();
        exam.vision.right_eye.uncorrected = Some("20/40".into());
        exam.intraocular_pressure.right_eye = Some(15.0);
        exam.refraction.left_eye.sphere = Some(-0.75);
        exam.diagnosis = vec!["H52.13 - Myopia".into(), "dry eye".into()];
        exam.plan = "RTC 1 year".into();
        exam
    }

    fn field<'c>(catalog: &'c FieldCatalog, id: &str) -> &'c FieldDescriptor {
        catalog.iter().find(|f| f.id == id).unwrap()
    }

    #[test]
    fn flatten_reads_current_values() {
        let catalog = flatten(&exam(), &examination_field_template()).unwrap();

        assert_eq!(field(&catalog, "chief_complaint").value, json!("blurry vision"));
        assert_eq!(field(&catalog, "va_od_uncorrected").value, json!("20/40"));
        assert_eq!(field(&catalog, "iop_od").value, json!(15.0));
        assert_eq!(field(&catalog, "iop_os").value, Value::Null);
        assert_eq!(field(&catalog, "refraction_os_sphere").value, json!(-0.75));
        assert_eq!(
            field(&catalog, "diagnosis").value,
            json!("H52.13 - Myopia, dry eye")
        );
    }

    #[test]
    fn flatten_preserves_template_order() {
        let template = examination_field_template();
        let catalog = flatten(&exam(), &template).unwrap();
        assert_eq!(catalog.len(), template.len());
        for (descriptor, entry) in catalog.iter().zip(&template) {
            assert_eq!(descriptor.id, entry.id);
        }
    }

    #[test]
    fn round_trip_reproduces_addressed_values() {
        let original = exam();
        let template = examination_field_template();
        let catalog = flatten(&original, &template).unwrap();
        let rebuilt: Examination = unflatten(&catalog, &original).unwrap();
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn unflatten_is_idempotent() {
        let base = exam();
        let template = examination_field_template();
        let mut catalog = flatten(&base, &template).unwrap();
        catalog
            .iter_mut()
            .find(|f| f.id == "va_os_uncorrected")
            .unwrap()
            .value = json!("20/20");

        let once: Examination = unflatten(&catalog, &base).unwrap();
        let twice: Examination = unflatten(&catalog, &once).unwrap();
        assert_eq!(once, twice);
        assert_eq!(once.vision.left_eye.uncorrected.as_deref(), Some("20/20"));
    }

    #[test]
    fn unflatten_skips_empty_values() {
        let base = exam();
        let template = examination_field_template();
        let mut catalog = flatten(&base, &template).unwrap();
        // An interpretation step answering blank must never erase data.
        catalog
            .iter_mut()
            .find(|f| f.id == "chief_complaint")
            .unwrap()
            .value = json!("   ");

        let rebuilt: Examination = unflatten(&catalog, &base).unwrap();
        assert_eq!(rebuilt.chief_complaint, "blurry vision");
    }

    #[test]
    fn unflatten_coerces_numeric_strings_for_number_fields() {
        let base = exam();
        let template = examination_field_template();
        let mut catalog = flatten(&base, &template).unwrap();
        catalog.iter_mut().find(|f| f.id == "iop_os").unwrap().value = json!("16");

        let rebuilt: Examination = unflatten(&catalog, &base).unwrap();
        assert_eq!(rebuilt.intraocular_pressure.left_eye, Some(16.0));
    }

    #[test]
    fn unflatten_writes_diagnosis_list_from_csv() {
        let base = exam();
        let template = examination_field_template();
        let mut catalog = flatten(&base, &template).unwrap();
        catalog
            .iter_mut()
            .find(|f| f.id == "diagnosis")
            .unwrap()
            .value = json!("H40.11X1 - POAG, H52.13 - Myopia");

        let rebuilt: Examination = unflatten(&catalog, &base).unwrap();
        assert_eq!(
            rebuilt.diagnosis,
            vec!["H40.11X1 - POAG".to_string(), "H52.13 - Myopia".to_string()]
        );
    }

    #[test]
    fn unflatten_rejects_value_that_does_not_fit_the_record() {
        let base = exam();
        let catalog = vec![FieldDescriptor {
            id: "va_od_uncorrected".into(),
            path: "vision.rightEye".into(),
            kind: FieldKind::Text,
            label: "Right Eye".into(),
            value: json!("not-an-object"),
        }];
        let result: Result<Examination, _> = unflatten(&catalog, &base);
        assert!(matches!(result, Err(FieldError::Serialization(_))));
    }
}
