//! Examination persistence: one flat column per declared field, lossless
//! both ways. The per-eye pairs fan out into prefixed columns; the diagnosis
//! list and the opaque pre-test blob are JSON text.

use std::str::FromStr;

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{
    Examination, ExaminationStatus, IopPair, Pupil, PupilPair, PupilReaction, Refraction,
    RefractionPair, Vision, VisionPair,
};

use super::{parse_date, parse_json, parse_timestamp, parse_uuid, to_json};

const COLUMNS: &str = "id, appointment_id, patient_id, doctor_id, date, chief_complaint, \
    va_right_uncorrected, va_right_corrected, va_right_pinhole, \
    va_left_uncorrected, va_left_corrected, va_left_pinhole, \
    iop_right, iop_left, \
    refraction_right_sphere, refraction_right_cylinder, refraction_right_axis, refraction_right_add, \
    refraction_left_sphere, refraction_left_cylinder, refraction_left_axis, refraction_left_add, \
    pupil_right_size, pupil_right_reaction, pupil_right_rapd, \
    pupil_left_size, pupil_left_reaction, pupil_left_rapd, \
    anterior_segment, posterior_segment, diagnosis, plan, follow_up, status, pre_test, \
    created_at, updated_at";

pub fn insert_examination(conn: &Connection, exam: &Examination) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO examinations ({COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                     ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30, ?31, ?32,
                     ?33, ?34, ?35, ?36, ?37)"
        ),
        params![
            exam.id.to_string(),
            exam.appointment_id.map(|id| id.to_string()),
            exam.patient_id.to_string(),
            exam.doctor_id.to_string(),
            exam.date.to_string(),
            exam.chief_complaint,
            exam.vision.right_eye.uncorrected,
            exam.vision.right_eye.corrected,
            exam.vision.right_eye.pinhole,
            exam.vision.left_eye.uncorrected,
            exam.vision.left_eye.corrected,
            exam.vision.left_eye.pinhole,
            exam.intraocular_pressure.right_eye,
            exam.intraocular_pressure.left_eye,
            exam.refraction.right_eye.sphere,
            exam.refraction.right_eye.cylinder,
            exam.refraction.right_eye.axis,
            exam.refraction.right_eye.add,
            exam.refraction.left_eye.sphere,
            exam.refraction.left_eye.cylinder,
            exam.refraction.left_eye.axis,
            exam.refraction.left_eye.add,
            exam.pupils.right_eye.size,
            exam.pupils.right_eye.reaction.map(|r| r.as_str()),
            exam.pupils.right_eye.rapd,
            exam.pupils.left_eye.size,
            exam.pupils.left_eye.reaction.map(|r| r.as_str()),
            exam.pupils.left_eye.rapd,
            exam.anterior_segment,
            exam.posterior_segment,
            to_json(&exam.diagnosis)?,
            exam.plan,
            exam.follow_up,
            exam.status.as_str(),
            exam.pre_test.as_ref().map(to_json).transpose()?,
            exam.created_at.to_rfc3339(),
            exam.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_examination(conn: &Connection, id: &Uuid) -> Result<Examination, DatabaseError> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM examinations WHERE id = ?1"),
        params![id.to_string()],
        examination_from_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DatabaseError::NotFound {
            entity_type: "examination".into(),
            id: id.to_string(),
        },
        other => DatabaseError::Sqlite(other),
    })?
}

/// The examination documenting a given appointment, if one was started.
pub fn get_examination_by_appointment(
    conn: &Connection,
    appointment_id: &Uuid,
) -> Result<Option<Examination>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM examinations WHERE appointment_id = ?1"
    ))?;
    let mut rows = stmt.query_map(params![appointment_id.to_string()], examination_from_row)?;

    match rows.next() {
        Some(row) => Ok(Some(row??)),
        None => Ok(None),
    }
}

/// Examinations for a patient, most recent first.
pub fn list_examinations_for_patient(
    conn: &Connection,
    patient_id: &Uuid,
) -> Result<Vec<Examination>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS} FROM examinations WHERE patient_id = ?1
         ORDER BY date DESC, created_at DESC"
    ))?;
    let rows = stmt.query_map(params![patient_id.to_string()], examination_from_row)?;

    let mut examinations = Vec::new();
    for row in rows {
        examinations.push(row??);
    }
    Ok(examinations)
}

pub fn update_examination(conn: &Connection, exam: &Examination) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE examinations SET
            appointment_id = ?2, patient_id = ?3, doctor_id = ?4, date = ?5,
            chief_complaint = ?6,
            va_right_uncorrected = ?7, va_right_corrected = ?8, va_right_pinhole = ?9,
            va_left_uncorrected = ?10, va_left_corrected = ?11, va_left_pinhole = ?12,
            iop_right = ?13, iop_left = ?14,
            refraction_right_sphere = ?15, refraction_right_cylinder = ?16,
            refraction_right_axis = ?17, refraction_right_add = ?18,
            refraction_left_sphere = ?19, refraction_left_cylinder = ?20,
            refraction_left_axis = ?21, refraction_left_add = ?22,
            pupil_right_size = ?23, pupil_right_reaction = ?24, pupil_right_rapd = ?25,
            pupil_left_size = ?26, pupil_left_reaction = ?27, pupil_left_rapd = ?28,
            anterior_segment = ?29, posterior_segment = ?30,
            diagnosis = ?31, plan = ?32, follow_up = ?33, status = ?34, pre_test = ?35,
            updated_at = ?36
         WHERE id = ?1",
        params![
            exam.id.to_string(),
            exam.appointment_id.map(|id| id.to_string()),
            exam.patient_id.to_string(),
            exam.doctor_id.to_string(),
            exam.date.to_string(),
            exam.chief_complaint,
            exam.vision.right_eye.uncorrected,
            exam.vision.right_eye.corrected,
            exam.vision.right_eye.pinhole,
            exam.vision.left_eye.uncorrected,
            exam.vision.left_eye.corrected,
            exam.vision.left_eye.pinhole,
            exam.intraocular_pressure.right_eye,
            exam.intraocular_pressure.left_eye,
            exam.refraction.right_eye.sphere,
            exam.refraction.right_eye.cylinder,
            exam.refraction.right_eye.axis,
            exam.refraction.right_eye.add,
            exam.refraction.left_eye.sphere,
            exam.refraction.left_eye.cylinder,
            exam.refraction.left_eye.axis,
            exam.refraction.left_eye.add,
            exam.pupils.right_eye.size,
            exam.pupils.right_eye.reaction.map(|r| r.as_str()),
            exam.pupils.right_eye.rapd,
            exam.pupils.left_eye.size,
            exam.pupils.left_eye.reaction.map(|r| r.as_str()),
            exam.pupils.left_eye.rapd,
            exam.anterior_segment,
            exam.posterior_segment,
            to_json(&exam.diagnosis)?,
            exam.plan,
            exam.follow_up,
            exam.status.as_str(),
            exam.pre_test.as_ref().map(to_json).transpose()?,
            exam.updated_at.to_rfc3339(),
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "examination".into(),
            id: exam.id.to_string(),
        });
    }
    Ok(())
}

fn examination_from_row(row: &Row<'_>) -> rusqlite::Result<Result<Examination, DatabaseError>> {
    let id: String = row.get(0)?;
    let appointment_id: Option<String> = row.get(1)?;
    let patient_id: String = row.get(2)?;
    let doctor_id: String = row.get(3)?;
    let date: String = row.get(4)?;
    let chief_complaint: String = row.get(5)?;

    let vision = VisionPair {
        right_eye: Vision {
            uncorrected: row.get(6)?,
            corrected: row.get(7)?,
            pinhole: row.get(8)?,
        },
        left_eye: Vision {
            uncorrected: row.get(9)?,
            corrected: row.get(10)?,
            pinhole: row.get(11)?,
        },
    };
    let intraocular_pressure = IopPair {
        right_eye: row.get(12)?,
        left_eye: row.get(13)?,
    };
    let refraction = RefractionPair {
        right_eye: Refraction {
            sphere: row.get(14)?,
            cylinder: row.get(15)?,
            axis: row.get(16)?,
            add: row.get(17)?,
        },
        left_eye: Refraction {
            sphere: row.get(18)?,
            cylinder: row.get(19)?,
            axis: row.get(20)?,
            add: row.get(21)?,
        },
    };
    let pupil_right_reaction: Option<String> = row.get(23)?;
    let pupil_left_reaction: Option<String> = row.get(26)?;
    let pupils = (
        row.get::<_, Option<f64>>(22)?,
        pupil_right_reaction,
        row.get::<_, bool>(24)?,
        row.get::<_, Option<f64>>(25)?,
        pupil_left_reaction,
        row.get::<_, bool>(27)?,
    );

    let anterior_segment: Option<String> = row.get(28)?;
    let posterior_segment: Option<String> = row.get(29)?;
    let diagnosis: String = row.get(30)?;
    let plan: String = row.get(31)?;
    let follow_up: String = row.get(32)?;
    let status: String = row.get(33)?;
    let pre_test: Option<String> = row.get(34)?;
    let created_at: String = row.get(35)?;
    let updated_at: String = row.get(36)?;

    Ok(build_examination(ExaminationRow {
        id,
        appointment_id,
        patient_id,
        doctor_id,
        date,
        chief_complaint,
        vision,
        intraocular_pressure,
        refraction,
        pupils,
        anterior_segment,
        posterior_segment,
        diagnosis,
        plan,
        follow_up,
        status,
        pre_test,
        created_at,
        updated_at,
    }))
}

struct ExaminationRow {
    id: String,
    appointment_id: Option<String>,
    patient_id: String,
    doctor_id: String,
    date: String,
    chief_complaint: String,
    vision: VisionPair,
    intraocular_pressure: IopPair,
    refraction: RefractionPair,
    pupils: (Option<f64>, Option<String>, bool, Option<f64>, Option<String>, bool),
    anterior_segment: Option<String>,
    posterior_segment: Option<String>,
    diagnosis: String,
    plan: String,
    follow_up: String,
    status: String,
    pre_test: Option<String>,
    created_at: String,
    updated_at: String,
}

fn build_examination(row: ExaminationRow) -> Result<Examination, DatabaseError> {
    let (right_size, right_reaction, right_rapd, left_size, left_reaction, left_rapd) = row.pupils;

    Ok(Examination {
        id: parse_uuid(&row.id)?,
        appointment_id: row.appointment_id.as_deref().map(parse_uuid).transpose()?,
        patient_id: parse_uuid(&row.patient_id)?,
        doctor_id: parse_uuid(&row.doctor_id)?,
        date: parse_date(&row.date)?,
        chief_complaint: row.chief_complaint,
        vision: row.vision,
        intraocular_pressure: row.intraocular_pressure,
        refraction: row.refraction,
        pupils: PupilPair {
            right_eye: Pupil {
                size: right_size,
                reaction: right_reaction
                    .as_deref()
                    .map(PupilReaction::from_str)
                    .transpose()?,
                rapd: right_rapd,
            },
            left_eye: Pupil {
                size: left_size,
                reaction: left_reaction
                    .as_deref()
                    .map(PupilReaction::from_str)
                    .transpose()?,
                rapd: left_rapd,
            },
        },
        anterior_segment: row.anterior_segment,
        posterior_segment: row.posterior_segment,
        diagnosis: parse_json(&row.diagnosis)?,
        plan: row.plan,
        follow_up: row.follow_up,
        status: ExaminationStatus::from_str(&row.status)?,
        pre_test: row.pre_test.as_deref().map(parse_json).transpose()?,
        created_at: parse_timestamp(&row.created_at)?,
        updated_at: parse_timestamp(&row.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use chrono::NaiveDate;
    use serde_json::json;

    fn sparse_exam() -> Examination {
        Examination::draft(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            None,
        )
    }

    fn full_exam() -> Examination {
        let mut exam = sparse_exam();
        exam.chief_complaint = "blurry vision x 2 weeks".into();
        exam.vision.right_eye = Vision {
            uncorrected: Some("20/40".into()),
            corrected: Some("20/25".into()),
            pinhole: Some("20/25".into()),
        };
        exam.vision.left_eye.uncorrected = Some("20/20".into());
        exam.intraocular_pressure = IopPair {
            right_eye: Some(15.0),
            left_eye: Some(16.5),
        };
        exam.refraction.right_eye = Refraction {
            sphere: Some(-1.25),
            cylinder: Some(-0.5),
            axis: Some(90.0),
            add: Some(2.0),
        };
        exam.pupils.right_eye = Pupil {
            size: Some(4.0),
            reaction: Some(PupilReaction::Normal),
            rapd: false,
        };
        exam.pupils.left_eye.rapd = true;
        exam.anterior_segment = Some("clear cornea OU".into());
        exam.diagnosis = vec!["H52.13 - Myopia".into()];
        exam.plan = "new spectacles".into();
        exam.follow_up = "1 year".into();
        exam.pre_test = Some(json!({"autorefractor": {"od": "-1.25"}}));
        exam
    }

    #[test]
    fn full_record_round_trips_exactly() {
        let conn = open_memory_database().unwrap();
        let exam = full_exam();
        insert_examination(&conn, &exam).unwrap();

        let loaded = get_examination(&conn, &exam.id).unwrap();
        assert_eq!(loaded.vision, exam.vision);
        assert_eq!(loaded.intraocular_pressure, exam.intraocular_pressure);
        assert_eq!(loaded.refraction, exam.refraction);
        assert_eq!(loaded.pupils, exam.pupils);
        assert_eq!(loaded.diagnosis, exam.diagnosis);
        assert_eq!(loaded.pre_test, exam.pre_test);
        assert_eq!(loaded.status, exam.status);
    }

    #[test]
    fn sparse_record_round_trips_with_nulls_absent() {
        let conn = open_memory_database().unwrap();
        let exam = sparse_exam();
        insert_examination(&conn, &exam).unwrap();

        let loaded = get_examination(&conn, &exam.id).unwrap();
        assert_eq!(loaded.vision, VisionPair::default());
        assert_eq!(loaded.intraocular_pressure, IopPair::default());
        assert!(loaded.pre_test.is_none());
        assert!(loaded.anterior_segment.is_none());
        assert!(loaded.diagnosis.is_empty());
    }

    #[test]
    fn update_overwrites_fields() {
        let conn = open_memory_database().unwrap();
        let mut exam = full_exam();
        insert_examination(&conn, &exam).unwrap();

        exam.status = ExaminationStatus::Completed;
        exam.diagnosis.push("dry eye".into());
        update_examination(&conn, &exam).unwrap();

        let loaded = get_examination(&conn, &exam.id).unwrap();
        assert_eq!(loaded.status, ExaminationStatus::Completed);
        assert_eq!(loaded.diagnosis.len(), 2);
    }

    #[test]
    fn list_for_patient_orders_recent_first() {
        let conn = open_memory_database().unwrap();
        let patient_id = Uuid::new_v4();

        let mut older = sparse_exam();
        older.patient_id = patient_id;
        older.date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let mut newer = sparse_exam();
        newer.patient_id = patient_id;
        newer.date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();

        insert_examination(&conn, &older).unwrap();
        insert_examination(&conn, &newer).unwrap();
        insert_examination(&conn, &sparse_exam()).unwrap();

        let listed = list_examinations_for_patient(&conn, &patient_id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[1].id, older.id);
    }

    #[test]
    fn lookup_by_appointment() {
        let conn = open_memory_database().unwrap();
        let mut exam = sparse_exam();
        let appointment_id = Uuid::new_v4();
        exam.appointment_id = Some(appointment_id);
        insert_examination(&conn, &exam).unwrap();

        let found = get_examination_by_appointment(&conn, &appointment_id).unwrap();
        assert_eq!(found.unwrap().id, exam.id);

        let missing = get_examination_by_appointment(&conn, &Uuid::new_v4()).unwrap();
        assert!(missing.is_none());
    }
}
