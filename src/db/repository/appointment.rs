use std::str::FromStr;

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{Appointment, AppointmentStatus, AppointmentType};

use super::{parse_date, parse_time, parse_timestamp, parse_uuid};

const COLUMNS: &str = "id, patient_id, doctor_id, date, start_time, end_time, \
                       appointment_type, status, notes, created_at, updated_at";

pub fn insert_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (id, patient_id, doctor_id, date, start_time, end_time,
                                   appointment_type, status, notes, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.doctor_id.map(|id| id.to_string()),
            appt.date.to_string(),
            appt.start_time.format("%H:%M:%S").to_string(),
            appt.end_time.format("%H:%M:%S").to_string(),
            appt.appointment_type.as_str(),
            appt.status.as_str(),
            appt.notes,
            appt.created_at.to_rfc3339(),
            appt.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_appointment(conn: &Connection, id: &Uuid) -> Result<Appointment, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM appointments WHERE id = ?1"),
        params![id.to_string()],
        appointment_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: id.to_string(),
        },
        other => DatabaseError::Sqlite(other),
    })?
}

pub fn update_appointment(conn: &Connection, appt: &Appointment) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE appointments
         SET patient_id = ?2, doctor_id = ?3, date = ?4, start_time = ?5, end_time = ?6,
             appointment_type = ?7, status = ?8, notes = ?9, updated_at = ?10
         WHERE id = ?1",
        params![
            appt.id.to_string(),
            appt.patient_id.to_string(),
            appt.doctor_id.map(|id| id.to_string()),
            appt.date.to_string(),
            appt.start_time.format("%H:%M:%S").to_string(),
            appt.end_time.format("%H:%M:%S").to_string(),
            appt.appointment_type.as_str(),
            appt.status.as_str(),
            appt.notes,
            appt.updated_at.to_rfc3339(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "appointment".into(),
            id: appt.id.to_string(),
        });
    }
    Ok(())
}

/// Appointments for a patient, most recent first.
pub fn list_appointments_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM appointments WHERE patient_id = ?1
         ORDER BY date DESC, start_time DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], appointment_from_row)?;

    let mut appointments = Vec::new();
    for row in rows {
        appointments.push(row??);
    }
    Ok(appointments)
}

fn appointment_from_row(row: &Row<'_>) -> rusqlite::Result<Result<Appointment, DatabaseError>> {
    let id: String = row.get(0)?;
    let patient_id: String = row.get(1)?;
    let doctor_id: Option<String> = row.get(2)?;
    let date: String = row.get(3)?;
    let start_time: String = row.get(4)?;
    let end_time: String = row.get(5)?;
    let appointment_type: String = row.get(6)?;
    let status: String = row.get(7)?;
    let notes: Option<String> = row.get(8)?;
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;

    Ok(build_appointment(
        id,
        patient_id,
        doctor_id,
        date,
        start_time,
        end_time,
        appointment_type,
        status,
        notes,
        created_at,
        updated_at,
    ))
}

#[allow(clippy::too_many_arguments)]
fn build_appointment(
    id: String,
    patient_id: String,
    doctor_id: Option<String>,
    date: String,
    start_time: String,
    end_time: String,
    appointment_type: String,
    status: String,
    notes: Option<String>,
    created_at: String,
    updated_at: String,
) -> Result<Appointment, DatabaseError> {
    Ok(Appointment {
        id: parse_uuid(&id)?,
        patient_id: parse_uuid(&patient_id)?,
        doctor_id: doctor_id.as_deref().map(parse_uuid).transpose()?,
        date: parse_date(&date)?,
        start_time: parse_time(&start_time)?,
        end_time: parse_time(&end_time)?,
        appointment_type: AppointmentType::from_str(&appointment_type)?,
        status: AppointmentStatus::from_str(&status)?,
        notes,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use chrono::{NaiveDate, NaiveTime};

    fn fixture() -> Appointment {
        Appointment::new(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            AppointmentType::NewPatient,
        )
    }

    #[test]
    fn insert_then_get_round_trips() {
        let conn = open_memory_database().unwrap();
        let appt = fixture();
        insert_appointment(&conn, &appt).unwrap();

        let loaded = get_appointment(&conn, &appt.id).unwrap();
        // Timestamps survive RFC 3339 with sub-second precision.
        assert_eq!(loaded.id, appt.id);
        assert_eq!(loaded.patient_id, appt.patient_id);
        assert_eq!(loaded.doctor_id, appt.doctor_id);
        assert_eq!(loaded.date, appt.date);
        assert_eq!(loaded.start_time, appt.start_time);
        assert_eq!(loaded.end_time, appt.end_time);
        assert_eq!(loaded.appointment_type, appt.appointment_type);
        assert_eq!(loaded.status, appt.status);
        assert_eq!(loaded.notes, appt.notes);
    }

    #[test]
    fn get_missing_reports_not_found() {
        let conn = open_memory_database().unwrap();
        let err = get_appointment(&conn, &Uuid::new_v4()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn update_persists_status_change() {
        let conn = open_memory_database().unwrap();
        let mut appt = fixture();
        insert_appointment(&conn, &appt).unwrap();

        appt.status = AppointmentStatus::CheckedIn;
        appt.notes = Some("arrived early".into());
        update_appointment(&conn, &appt).unwrap();

        let loaded = get_appointment(&conn, &appt.id).unwrap();
        assert_eq!(loaded.status, AppointmentStatus::CheckedIn);
        assert_eq!(loaded.notes.as_deref(), Some("arrived early"));
    }

    #[test]
    fn update_missing_reports_not_found() {
        let conn = open_memory_database().unwrap();
        let err = update_appointment(&conn, &fixture()).unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound { .. }));
    }

    #[test]
    fn list_for_patient_orders_recent_first() {
        let conn = open_memory_database().unwrap();
        let patient_id = Uuid::new_v4();

        let mut older = fixture();
        older.patient_id = patient_id;
        older.date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut newer = fixture();
        newer.patient_id = patient_id;
        newer.date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        insert_appointment(&conn, &older).unwrap();
        insert_appointment(&conn, &newer).unwrap();
        insert_appointment(&conn, &fixture()).unwrap(); // other patient

        let listed = list_appointments_for_patient(&conn, &patient_id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }
}
