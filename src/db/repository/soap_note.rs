use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::SoapNote;

use super::{parse_json, parse_timestamp, parse_uuid, to_json};

const COLUMNS: &str = "id, examination_id, patient_id, doctor_id, subjective, objective, \
    assessment, plan, icd_codes, mips_compliant, mips_categories, return_to_clinic, \
    created_at, updated_at";

pub fn insert_soap_note(conn: &Connection, note: &SoapNote) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO soap_notes ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
        ),
        params![
            note.id.to_string(),
            note.examination_id.to_string(),
            note.patient_id.to_string(),
            note.doctor_id.to_string(),
            note.subjective,
            note.objective,
            note.assessment,
            note.plan,
            to_json(&note.icd_codes)?,
            note.mips_compliant,
            to_json(&note.mips_categories)?,
            note.return_to_clinic,
            note.created_at.to_rfc3339(),
            note.updated_at.to_rfc3339(),
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation(format!(
                "soap note already exists for examination {}",
                note.examination_id
            ))
        }
        other => DatabaseError::Sqlite(other),
    })?;
    Ok(())
}

pub fn get_soap_note(conn: &Connection, id: &Uuid) -> Result<SoapNote, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM soap_notes WHERE id = ?1"),
        params![id.to_string()],
        soap_note_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "soap_note".into(),
            id: id.to_string(),
        },
        other => DatabaseError::Sqlite(other),
    })?
}

/// The note finalizing a given examination, if one exists (1:1).
pub fn get_soap_note_by_examination(
    conn: &Connection,
    examination_id: &Uuid,
) -> Result<Option<SoapNote>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM soap_notes WHERE examination_id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![examination_id.to_string()], soap_note_from_row)?;

    match rows.next() {
        Some(row) => Ok(Some(row??)),
        None => Ok(None),
    }
}

pub fn update_soap_note(conn: &Connection, note: &SoapNote) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE soap_notes SET
            subjective = ?2, objective = ?3, assessment = ?4, plan = ?5,
            icd_codes = ?6, mips_compliant = ?7, mips_categories = ?8,
            return_to_clinic = ?9, updated_at = ?10
         WHERE id = ?1",
        params![
            note.id.to_string(),
            note.subjective,
            note.objective,
            note.assessment,
            note.plan,
            to_json(&note.icd_codes)?,
            note.mips_compliant,
            to_json(&note.mips_categories)?,
            note.return_to_clinic,
            note.updated_at.to_rfc3339(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "soap_note".into(),
            id: note.id.to_string(),
        });
    }
    Ok(())
}

fn soap_note_from_row(row: &Row<'_>) -> rusqlite::Result<Result<SoapNote, DatabaseError>> {
    let id: String = row.get(0)?;
    let examination_id: String = row.get(1)?;
    let patient_id: String = row.get(2)?;
    let doctor_id: String = row.get(3)?;
    let subjective: String = row.get(4)?;
    let objective: String = row.get(5)?;
    let assessment: String = row.get(6)?;
    let plan: String = row.get(7)?;
    let icd_codes: String = row.get(8)?;
    let mips_compliant: bool = row.get(9)?;
    let mips_categories: String = row.get(10)?;
    let return_to_clinic: String = row.get(11)?;
    let created_at: String = row.get(12)?;
    let updated_at: String = row.get(13)?;

    Ok((|| {
        Ok(SoapNote {
            id: parse_uuid(&id)?,
            examination_id: parse_uuid(&examination_id)?,
            patient_id: parse_uuid(&patient_id)?,
            doctor_id: parse_uuid(&doctor_id)?,
            subjective,
            objective,
            assessment,
            plan,
            icd_codes: parse_json(&icd_codes)?,
            mips_compliant,
            mips_categories: parse_json(&mips_categories)?,
            return_to_clinic,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    })())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use crate::models::{Examination, IcdCode};
    use chrono::NaiveDate;

    fn note_fixture() -> SoapNote {
        let exam = Examination::draft(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            None,
        );
        let mut note = SoapNote::compose(&exam);
        note.subjective = "Chief complaint: blurry vision".into();
        note.icd_codes = vec![IcdCode {
            code: "H52.13".into(),
            description: "Myopia, bilateral".into(),
        }];
        note.mips_categories = vec!["Quality".into()];
        note.return_to_clinic = "1 year".into();
        note
    }

    #[test]
    fn insert_then_get_round_trips() {
        let conn = open_memory_database().unwrap();
        let note = note_fixture();
        insert_soap_note(&conn, &note).unwrap();

        let loaded = get_soap_note(&conn, &note.id).unwrap();
        assert_eq!(loaded.examination_id, note.examination_id);
        assert_eq!(loaded.icd_codes, note.icd_codes);
        assert_eq!(loaded.mips_categories, note.mips_categories);
        assert_eq!(loaded.subjective, note.subjective);
        assert_eq!(loaded.mips_compliant, note.mips_compliant);
    }

    #[test]
    fn second_note_for_same_examination_rejected() {
        let conn = open_memory_database().unwrap();
        let note = note_fixture();
        insert_soap_note(&conn, &note).unwrap();

        let mut duplicate = note_fixture();
        duplicate.examination_id = note.examination_id;
        let err = insert_soap_note(&conn, &duplicate).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn lookup_by_examination() {
        let conn = open_memory_database().unwrap();
        let note = note_fixture();
        insert_soap_note(&conn, &note).unwrap();

        let found = get_soap_note_by_examination(&conn, &note.examination_id).unwrap();
        assert_eq!(found.unwrap().id, note.id);
        assert!(get_soap_note_by_examination(&conn, &Uuid::new_v4())
            .unwrap()
            .is_none());
    }

    #[test]
    fn update_persists_edits() {
        let conn = open_memory_database().unwrap();
        let mut note = note_fixture();
        insert_soap_note(&conn, &note).unwrap();

        note.mips_compliant = true;
        note.assessment = "H52.13 - Myopia, bilateral".into();
        update_soap_note(&conn, &note).unwrap();

        let loaded = get_soap_note(&conn, &note.id).unwrap();
        assert!(loaded.mips_compliant);
        assert!(loaded.assessment.contains("Myopia"));
    }
}
