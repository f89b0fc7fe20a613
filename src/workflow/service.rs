//! Database-backed side of the workflow contract.
//!
//! The pure triggers in `encounter` transform in-memory records; these
//! functions load the authoritative copy, apply the trigger, and write the
//! result back. Linked-entity status writes are best-effort: if the
//! secondary write fails after the primary committed, the primary stands,
//! the failure is logged and surfaced independently, and a retry is safe
//! because transitions are idempotent.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{
    get_appointment, get_examination, get_soap_note_by_examination, insert_examination,
    insert_soap_note, update_appointment, update_examination,
};
use crate::fields::FieldTemplate;
use crate::interpret::FieldInterpreter;
use crate::models::{Appointment, Examination, SoapNote};

use super::encounter::{
    apply_free_text_update, begin_examination, cancel_appointment, check_in,
    complete_examination, ExaminationCompletion, FreeTextUpdate,
};
use super::WorkflowError;

/// Check a patient in and persist the new status.
pub fn check_in_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Appointment, WorkflowError> {
    let appointment = check_in(get_appointment(conn, appointment_id)?)?;
    update_appointment(conn, &appointment)?;
    Ok(appointment)
}

/// Open the exam form: flag the appointment in-progress, create the draft.
/// The appointment status write lands before any examination write.
pub fn begin_examination_for(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<(Appointment, Examination), WorkflowError> {
    let (appointment, draft) = begin_examination(get_appointment(conn, appointment_id)?)?;
    update_appointment(conn, &appointment)?;
    insert_examination(conn, &draft)?;
    Ok((appointment, draft))
}

/// Complete an examination; pull the linked appointment along best-effort.
///
/// The examination update is the primary commit. A failure on the linked
/// appointment (illegal transition or a failed write) leaves the two
/// transiently inconsistent, to be reconciled on next read.
pub fn complete_examination_by_id(
    conn: &Connection,
    examination_id: &Uuid,
) -> Result<ExaminationCompletion, WorkflowError> {
    let examination = get_examination(conn, examination_id)?;

    let linked = match examination.appointment_id {
        Some(appointment_id) => match get_appointment(conn, &appointment_id) {
            Ok(appt) => Some(appt),
            Err(e) => {
                tracing::warn!(
                    examination_id = %examination_id,
                    appointment_id = %appointment_id,
                    error = %e,
                    "Linked appointment could not be read; completing examination alone"
                );
                None
            }
        },
        None => None,
    };

    let mut outcome = complete_examination(examination, linked);
    update_examination(conn, &outcome.examination)?;

    if let Some(ref appointment) = outcome.appointment {
        if let Err(e) = update_appointment(conn, appointment) {
            tracing::warn!(
                appointment_id = %appointment.id,
                error = %e,
                "Appointment status write failed after examination completed; retry is safe"
            );
            outcome.appointment_error = Some(e.into());
            outcome.appointment = None;
        }
    }

    Ok(outcome)
}

/// Cancel an appointment and persist. Any existing examination is untouched.
pub fn cancel_appointment_by_id(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Appointment, WorkflowError> {
    let appointment = cancel_appointment(get_appointment(conn, appointment_id)?)?;
    update_appointment(conn, &appointment)?;
    Ok(appointment)
}

/// Compose and store the SOAP note for an examination. Exactly one note per
/// examination: a second finalization is rejected.
pub fn finalize_soap_note(
    conn: &Connection,
    examination_id: &Uuid,
) -> Result<SoapNote, WorkflowError> {
    let examination = get_examination(conn, examination_id)?;

    if get_soap_note_by_examination(conn, examination_id)?.is_some() {
        return Err(WorkflowError::NoteAlreadyExists(*examination_id));
    }

    let note = SoapNote::compose(&examination);
    insert_soap_note(conn, &note)?;
    Ok(note)
}

/// Assisted entry against the stored examination: interpret the dictation,
/// merge, persist the merged record when anything was accepted.
pub fn apply_free_text_to_examination(
    conn: &Connection,
    examination_id: &Uuid,
    template: &[FieldTemplate],
    raw_text: &str,
    context: Option<&str>,
    interpreter: &dyn FieldInterpreter,
) -> Result<FreeTextUpdate, WorkflowError> {
    let examination = get_examination(conn, examination_id)?;
    let mut update = apply_free_text_update(&examination, template, raw_text, context, interpreter)?;

    if !update.changed_labels.is_empty() {
        update.record.updated_at = chrono::Utc::now();
        update_examination(conn, &update.record)?;
    }

    Ok(update)
}
