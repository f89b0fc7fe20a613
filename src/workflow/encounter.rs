//! Workflow triggers: pure transformations over in-memory records.
//!
//! Every function takes the caller's copy of a record and returns a new
//! value; the surrounding application owns the authoritative copy, persists
//! the result, and re-reads afterward. Appointment and examination status
//! are kept consistent by explicit side effects here, never by shared state.

use crate::fields::{flatten, reconcile, unflatten, FieldTemplate};
use crate::interpret::FieldInterpreter;
use crate::models::{
    validate_appointment, validate_examination, Appointment, AppointmentStatus, Examination,
    ExaminationStatus,
};

use super::status::{transition_appointment, transition_examination};
use super::WorkflowError;

/// Result of completing an examination. The examination change is the
/// primary commit; the linked appointment transition is best-effort and any
/// failure is carried here instead of unwinding the primary.
#[derive(Debug)]
pub struct ExaminationCompletion {
    pub examination: Examination,
    pub appointment: Option<Appointment>,
    /// Set when the linked appointment could not follow; safe to retry
    /// independently.
    pub appointment_error: Option<WorkflowError>,
}

/// Outcome of a free-text assisted-entry pass.
#[derive(Debug)]
pub struct FreeTextUpdate {
    pub record: Examination,
    /// Labels of fields that changed, for user-facing confirmation. Empty
    /// means "no relevant information found", which is a valid outcome.
    pub changed_labels: Vec<String>,
}

/// Check a patient in. Leaves any examination untouched (none may exist yet).
pub fn check_in(appointment: Appointment) -> Result<Appointment, WorkflowError> {
    validate_appointment(&appointment).map_err(WorkflowError::Validation)?;
    transition_appointment(appointment, AppointmentStatus::CheckedIn)
}

/// Begin documenting a visit: the appointment goes in-progress first, then a
/// draft examination is created carrying the patient, doctor, date and link.
/// The visit needs an assigned doctor before documentation can start.
pub fn begin_examination(
    appointment: Appointment,
) -> Result<(Appointment, Examination), WorkflowError> {
    let doctor_id = appointment.doctor_id.ok_or_else(|| {
        WorkflowError::Validation(vec![crate::models::InvariantViolation {
            field: "doctorId".into(),
            message: "an examining doctor must be assigned before documentation starts".into(),
        }])
    })?;

    let appointment = transition_appointment(appointment, AppointmentStatus::InProgress)?;
    let draft = Examination::draft(
        appointment.patient_id,
        doctor_id,
        appointment.date,
        Some(appointment.id),
    );
    Ok((appointment, draft))
}

/// Complete an examination, pulling the linked appointment to completed as a
/// best-effort side effect. The examination transition always commits; if
/// the appointment cannot follow (already cancelled, say) the two may
/// transiently disagree, to be reconciled on next read.
pub fn complete_examination(
    examination: Examination,
    linked_appointment: Option<Appointment>,
) -> ExaminationCompletion {
    // in-progress -> completed and completed -> completed are both legal,
    // so the primary transition cannot fail.
    let examination = transition_examination(examination.clone(), ExaminationStatus::Completed)
        .unwrap_or(examination);

    let (appointment, appointment_error) = match linked_appointment {
        None => (None, None),
        Some(appt) => match transition_appointment(appt, AppointmentStatus::Completed) {
            Ok(appt) => (Some(appt), None),
            Err(err) => {
                tracing::warn!(
                    examination_id = %examination.id,
                    error = %err,
                    "Linked appointment did not follow examination completion"
                );
                (None, Some(err))
            }
        },
    };

    ExaminationCompletion {
        examination,
        appointment,
        appointment_error,
    }
}

/// Cancel an appointment. Terminal; never retroactively alters an existing
/// examination.
pub fn cancel_appointment(appointment: Appointment) -> Result<Appointment, WorkflowError> {
    transition_appointment(appointment, AppointmentStatus::Cancelled)
}

/// Assisted entry: flatten the record, hand the dictation to the
/// interpreter, reconcile the answer, and fold accepted changes back in.
/// The merged record must still satisfy the examination invariants; an
/// interpreter answer carrying an implausible measurement rejects whole.
pub fn apply_free_text_update(
    record: &Examination,
    template: &[FieldTemplate],
    raw_text: &str,
    context: Option<&str>,
    interpreter: &dyn FieldInterpreter,
) -> Result<FreeTextUpdate, WorkflowError> {
    let original = flatten(record, template)?;
    let candidate = interpreter.interpret(raw_text, &original, context)?;
    let reconciliation = reconcile(&original, &candidate)?;

    if reconciliation.is_no_signal() {
        return Ok(FreeTextUpdate {
            record: record.clone(),
            changed_labels: Vec::new(),
        });
    }

    let record = unflatten(&reconciliation.accepted, record)?;
    validate_examination(&record).map_err(WorkflowError::Validation)?;
    Ok(FreeTextUpdate {
        record,
        changed_labels: reconciliation.changed_labels,
    })
}
