//! Invariant checks over candidate records.
//!
//! Validation never mutates: a record either passes unchanged or the caller
//! gets the full list of violated invariants, each naming the offending
//! field. Enum membership is enforced by the type system; only value-range
//! invariants live here.

use super::appointment::Appointment;
use super::examination::{Examination, Refraction};

/// One violated invariant, naming the field it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check appointment invariants: start time strictly precedes end time.
pub fn validate_appointment(appt: &Appointment) -> Result<(), Vec<InvariantViolation>> {
    let mut violations = Vec::new();

    if appt.start_time >= appt.end_time {
        violations.push(InvariantViolation {
            field: "startTime/endTime".into(),
            message: format!(
                "start time {} must precede end time {}",
                appt.start_time, appt.end_time
            ),
        });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Check examination invariants: axis range per eye, non-negative
/// measurements where present.
pub fn validate_examination(exam: &Examination) -> Result<(), Vec<InvariantViolation>> {
    let mut violations = Vec::new();

    check_refraction(&exam.refraction.right_eye, "refraction.rightEye", &mut violations);
    check_refraction(&exam.refraction.left_eye, "refraction.leftEye", &mut violations);

    for (field, iop) in [
        ("intraocularPressure.rightEye", exam.intraocular_pressure.right_eye),
        ("intraocularPressure.leftEye", exam.intraocular_pressure.left_eye),
    ] {
        if let Some(mmhg) = iop {
            if mmhg < 0.0 {
                violations.push(InvariantViolation {
                    field: field.into(),
                    message: format!("pressure {mmhg} mmHg cannot be negative"),
                });
            }
        }
    }

    for (field, size) in [
        ("pupils.rightEye.size", exam.pupils.right_eye.size),
        ("pupils.leftEye.size", exam.pupils.left_eye.size),
    ] {
        if let Some(mm) = size {
            if mm < 0.0 {
                violations.push(InvariantViolation {
                    field: field.into(),
                    message: format!("pupil size {mm} mm cannot be negative"),
                });
            }
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

fn check_refraction(refraction: &Refraction, prefix: &str, violations: &mut Vec<InvariantViolation>) {
    if let Some(axis) = refraction.axis {
        if !(0.0..=180.0).contains(&axis) {
            violations.push(InvariantViolation {
                field: format!("{prefix}.axis"),
                message: format!("axis {axis} outside 0-180"),
            });
        }
    }
}
