//! Change-detection merge between an original field catalog and the
//! candidate catalog returned by the interpretation step.
//!
//! The merge is strictly additive/corrective: it can fill a blank field or
//! correct a field's content, but a missing or blank answer can never erase
//! existing data. Comparison is by trimmed rendered string, not structural
//! equality, because candidate values arrive with potentially different
//! primitive types than the original.

use super::catalog::{is_empty_value, stringify_value, FieldCatalog, FieldDescriptor};
use super::FieldError;

/// Accepted changes plus the human-readable labels of what changed,
/// for user-facing confirmation.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Accepted subset of the candidate catalog, in original order.
    pub accepted: FieldCatalog,
    pub changed_labels: Vec<String>,
}

impl Reconciliation {
    /// No field was accepted. Reported to the user as "nothing to update",
    /// never treated as an error.
    pub fn is_no_signal(&self) -> bool {
        self.accepted.is_empty()
    }
}

/// Decide which candidate fields actually changed and are safe to apply.
///
/// Precondition: the catalogs have equal length and matching descriptor ids
/// in the same order. A mismatch is fatal: no partial reconciliation is
/// attempted and the caller must not apply any part of the result.
pub fn reconcile(
    original: &[FieldDescriptor],
    candidate: &[FieldDescriptor],
) -> Result<Reconciliation, FieldError> {
    if original.len() != candidate.len() {
        return Err(FieldError::CatalogMismatch {
            original: original.len(),
            candidate: candidate.len(),
        });
    }

    let mut result = Reconciliation::default();

    for (index, (before, after)) in original.iter().zip(candidate).enumerate() {
        if before.id != after.id {
            return Err(FieldError::CatalogOrderMismatch {
                index,
                expected: before.id.clone(),
                actual: after.id.clone(),
            });
        }

        // An empty candidate is never a change, whatever the original holds.
        if is_empty_value(&after.value) {
            continue;
        }

        let original_text = stringify_value(&before.value);
        let candidate_text = stringify_value(&after.value);
        if candidate_text.is_empty() || candidate_text == original_text {
            continue;
        }

        result.changed_labels.push(after.label.clone());
        result.accepted.push(after.clone());
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::catalog::FieldKind;
    use serde_json::{json, Value};

    fn descriptor(id: &str, label: &str, value: Value) -> FieldDescriptor {
        FieldDescriptor {
            id: id.into(),
            path: id.into(),
            kind: FieldKind::Text,
            label: label.into(),
            value,
        }
    }

    #[test]
    fn fills_blank_and_corrects_content() {
        let original = vec![
            descriptor("chief_complaint", "Chief Complaint", json!("")),
            descriptor("plan", "Plan", json!("RTC 6 months")),
        ];
        let candidate = vec![
            descriptor("chief_complaint", "Chief Complaint", json!("blurry vision")),
            descriptor("plan", "Plan", json!("RTC 1 year")),
        ];

        let result = reconcile(&original, &candidate).unwrap();
        assert_eq!(result.accepted.len(), 2);
        assert_eq!(result.changed_labels, vec!["Chief Complaint", "Plan"]);
    }

    #[test]
    fn empty_candidate_never_accepted() {
        let original = vec![descriptor("plan", "Plan", json!("RTC 1 year"))];
        for empty in [Value::Null, json!(""), json!("   "), json!([])] {
            let candidate = vec![descriptor("plan", "Plan", empty)];
            let result = reconcile(&original, &candidate).unwrap();
            assert!(result.is_no_signal());
        }
    }

    #[test]
    fn equal_stringified_values_not_reported_as_changed() {
        let original = vec![descriptor("va", "Right Eye VA", json!("20/40"))];
        let candidate = vec![descriptor("va", "Right Eye VA", json!("  20/40 "))];
        let result = reconcile(&original, &candidate).unwrap();
        assert!(result.is_no_signal());
        assert!(result.changed_labels.is_empty());
    }

    #[test]
    fn numeric_string_vs_number_compare_as_text() {
        // "15" (string) against 15 (number) renders identically, so no change.
        let original = vec![descriptor("iop_od", "Right Eye IOP", json!(15))];
        let candidate = vec![descriptor("iop_od", "Right Eye IOP", json!("15"))];
        assert!(reconcile(&original, &candidate).unwrap().is_no_signal());

        // "15.5" against 15 is a real content change.
        let candidate = vec![descriptor("iop_od", "Right Eye IOP", json!("15.5"))];
        let result = reconcile(&original, &candidate).unwrap();
        assert_eq!(result.accepted.len(), 1);
    }

    #[test]
    fn accepted_subset_preserves_original_order() {
        let original = vec![
            descriptor("a", "A", json!("1")),
            descriptor("b", "B", json!("2")),
            descriptor("c", "C", json!("3")),
        ];
        let candidate = vec![
            descriptor("a", "A", json!("9")),
            descriptor("b", "B", json!("2")),
            descriptor("c", "C", json!("7")),
        ];
        let result = reconcile(&original, &candidate).unwrap();
        let ids: Vec<_> = result.accepted.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let original = vec![descriptor("a", "A", json!("1"))];
        let candidate = vec![
            descriptor("a", "A", json!("1")),
            descriptor("b", "B", json!("2")),
        ];
        assert!(matches!(
            reconcile(&original, &candidate),
            Err(FieldError::CatalogMismatch { original: 1, candidate: 2 })
        ));
    }

    #[test]
    fn id_order_mismatch_is_fatal() {
        let original = vec![
            descriptor("a", "A", json!("1")),
            descriptor("b", "B", json!("2")),
        ];
        let candidate = vec![
            descriptor("b", "B", json!("2")),
            descriptor("a", "A", json!("1")),
        ];
        assert!(matches!(
            reconcile(&original, &candidate),
            Err(FieldError::CatalogOrderMismatch { index: 0, .. })
        ));
    }
}
