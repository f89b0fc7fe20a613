use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{ExaminationStatus, PupilReaction};

/// Visual acuity measurements for one eye ("20/40" style strings).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vision {
    pub uncorrected: Option<String>,
    pub corrected: Option<String>,
    pub pinhole: Option<String>,
}

/// Manifest refraction for one eye. Axis is in degrees, 0 to 180.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Refraction {
    pub sphere: Option<f64>,
    pub cylinder: Option<f64>,
    pub axis: Option<f64>,
    pub add: Option<f64>,
}

/// Pupil testing for one eye.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pupil {
    /// Diameter in mm.
    pub size: Option<f64>,
    pub reaction: Option<PupilReaction>,
    /// Relative afferent pupillary defect present.
    pub rapd: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisionPair {
    pub right_eye: Vision,
    pub left_eye: Vision,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefractionPair {
    pub right_eye: Refraction,
    pub left_eye: Refraction,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PupilPair {
    pub right_eye: Pupil,
    pub left_eye: Pupil,
}

/// Intraocular pressure in mmHg. The per-eye slots are scalars, not
/// sub-objects; the legacy field catalog addresses them with a
/// trailing-dot path (see `fields::path`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IopPair {
    pub right_eye: Option<f64>,
    pub left_eye: Option<f64>,
}

/// One eye examination. Owned exclusively by one patient; referenced by at
/// most one SOAP note. Becomes immutable in spirit once completed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Examination {
    pub id: Uuid,
    /// Link back to the visit, when documentation started from one.
    pub appointment_id: Option<Uuid>,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub date: NaiveDate,
    pub chief_complaint: String,
    pub vision: VisionPair,
    pub intraocular_pressure: IopPair,
    pub refraction: RefractionPair,
    pub pupils: PupilPair,
    pub anterior_segment: Option<String>,
    pub posterior_segment: Option<String>,
    /// Ordered list; each entry is optionally "CODE - description".
    pub diagnosis: Vec<String>,
    pub plan: String,
    pub follow_up: String,
    pub status: ExaminationStatus,
    /// Opaque pre-test instrument data (autorefractor, NCT, ...).
    pub pre_test: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Examination {
    /// Blank in-progress examination for a patient visit.
    pub fn draft(
        patient_id: Uuid,
        doctor_id: Uuid,
        date: NaiveDate,
        appointment_id: Option<Uuid>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            appointment_id,
            patient_id,
            doctor_id,
            date,
            chief_complaint: String::new(),
            vision: VisionPair::default(),
            intraocular_pressure: IopPair::default(),
            refraction: RefractionPair::default(),
            pupils: PupilPair::default(),
            anterior_segment: None,
            posterior_segment: None,
            diagnosis: Vec::new(),
            plan: String::new(),
            follow_up: String::new(),
            status: ExaminationStatus::InProgress,
            pre_test: None,
            created_at: now,
            updated_at: now,
        }
    }
}
