//! Encounter status state machine.
//!
//! Appointment: scheduled -> checked-in -> in-progress -> completed, with
//! cancelled reachable from any non-terminal state. Completing an
//! examination may close a checked-in appointment directly, so checked-in
//! also admits completed. Examination: in-progress -> completed.
//!
//! Re-applying the current status is an idempotent no-op: the record comes
//! back unchanged, timestamp untouched, no side effect. Every effective
//! transition stamps `updated_at`.

use chrono::Utc;

use super::WorkflowError;
use crate::models::{Appointment, AppointmentStatus, Examination, ExaminationStatus};

impl AppointmentStatus {
    /// Whether `target` is reachable from this status in one transition.
    /// Same-status re-application is always allowed (no-op).
    pub fn can_transition_to(&self, target: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        if *self == target {
            return true;
        }
        match self {
            Scheduled => matches!(target, CheckedIn | Cancelled),
            CheckedIn => matches!(target, InProgress | Completed | Cancelled),
            InProgress => matches!(target, Completed | Cancelled),
            Completed | Cancelled => false,
        }
    }
}

impl ExaminationStatus {
    pub fn can_transition_to(&self, target: ExaminationStatus) -> bool {
        use ExaminationStatus::*;
        match (self, target) {
            (InProgress, _) => true,
            (Completed, Completed) => true,
            (Completed, InProgress) => false,
        }
    }
}

/// Apply a status transition to an appointment, stamping `updated_at` on an
/// effective change. Illegal transitions return the named reason; the caller
/// keeps the unchanged record it already holds.
pub fn transition_appointment(
    mut appt: Appointment,
    target: AppointmentStatus,
) -> Result<Appointment, WorkflowError> {
    if appt.status == target {
        return Ok(appt);
    }
    if !appt.status.can_transition_to(target) {
        return Err(WorkflowError::IllegalTransition {
            entity: "appointment",
            from: appt.status.as_str().to_string(),
            to: target.as_str().to_string(),
        });
    }
    appt.status = target;
    appt.updated_at = Utc::now();
    Ok(appt)
}

/// Apply a status transition to an examination.
pub fn transition_examination(
    mut exam: Examination,
    target: ExaminationStatus,
) -> Result<Examination, WorkflowError> {
    if exam.status == target {
        return Ok(exam);
    }
    if !exam.status.can_transition_to(target) {
        return Err(WorkflowError::IllegalTransition {
            entity: "examination",
            from: exam.status.as_str().to_string(),
            to: target.as_str().to_string(),
        });
    }
    exam.status = target;
    exam.updated_at = Utc::now();
    Ok(exam)
}
