use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{AppointmentStatus, AppointmentType};

/// A scheduled patient visit. Created at scheduling, mutated through status
/// transitions and edits, never deleted; cancellation is a terminal status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(rename = "type")]
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// New appointment in `scheduled` status.
    pub fn new(
        patient_id: Uuid,
        doctor_id: Option<Uuid>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        appointment_type: AppointmentType,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            patient_id,
            doctor_id,
            date,
            start_time,
            end_time,
            appointment_type,
            status: AppointmentStatus::Scheduled,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_appointment_starts_scheduled() {
        let appt = Appointment::new(
            Uuid::new_v4(),
            None,
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            AppointmentType::NewPatient,
        );
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert!(appt.notes.is_none());
        assert_eq!(appt.created_at, appt.updated_at);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let appt = Appointment::new(
            Uuid::new_v4(),
            Some(Uuid::new_v4()),
            NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            AppointmentType::FollowUp,
        );
        let value = serde_json::to_value(&appt).unwrap();
        assert!(value.get("patientId").is_some());
        assert!(value.get("startTime").is_some());
        assert_eq!(value["type"], "follow-up");
        assert_eq!(value["status"], "scheduled");
    }
}
