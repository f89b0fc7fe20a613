//! SOAP note record and its template-based composition from an examination.
//!
//! Composition is deterministic text assembly, no LLM: subjective from the
//! chief complaint, objective from measurements, assessment from the
//! diagnosis list, plan from plan + follow-up.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::examination::Examination;

/// ICD-10 code with its human description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IcdCode {
    pub code: String,
    pub description: String,
}

/// Finalized clinical note, 1:1 with its examination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoapNote {
    pub id: Uuid,
    pub examination_id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub subjective: String,
    pub objective: String,
    pub assessment: String,
    pub plan: String,
    pub icd_codes: Vec<IcdCode>,
    pub mips_compliant: bool,
    pub mips_categories: Vec<String>,
    pub return_to_clinic: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SoapNote {
    /// Derive a note from an examination's documented fields.
    pub fn compose(exam: &Examination) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            examination_id: exam.id,
            patient_id: exam.patient_id,
            doctor_id: exam.doctor_id,
            subjective: compose_subjective(exam),
            objective: compose_objective(exam),
            assessment: exam.diagnosis.join("\n"),
            plan: compose_plan(exam),
            icd_codes: exam.diagnosis.iter().map(|d| parse_icd_entry(d)).collect(),
            mips_compliant: false,
            mips_categories: Vec::new(),
            return_to_clinic: exam.follow_up.clone(),
            created_at: now,
            updated_at: now,
        }
    }
}

fn compose_subjective(exam: &Examination) -> String {
    if exam.chief_complaint.trim().is_empty() {
        String::new()
    } else {
        format!("Chief complaint: {}", exam.chief_complaint.trim())
    }
}

fn compose_objective(exam: &Examination) -> String {
    let mut lines = Vec::new();

    let va = |label: &str, v: &Option<String>| -> Option<String> {
        v.as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("{label} {}", s.trim()))
    };

    let mut vision_parts = Vec::new();
    vision_parts.extend(va("OD", &exam.vision.right_eye.uncorrected));
    vision_parts.extend(va("OS", &exam.vision.left_eye.uncorrected));
    if !vision_parts.is_empty() {
        lines.push(format!("VA (uncorrected): {}", vision_parts.join(", ")));
    }

    let mut corrected_parts = Vec::new();
    corrected_parts.extend(va("OD", &exam.vision.right_eye.corrected));
    corrected_parts.extend(va("OS", &exam.vision.left_eye.corrected));
    if !corrected_parts.is_empty() {
        lines.push(format!("VA (corrected): {}", corrected_parts.join(", ")));
    }

    let mut iop_parts = Vec::new();
    if let Some(od) = exam.intraocular_pressure.right_eye {
        iop_parts.push(format!("OD {od} mmHg"));
    }
    if let Some(os) = exam.intraocular_pressure.left_eye {
        iop_parts.push(format!("OS {os} mmHg"));
    }
    if !iop_parts.is_empty() {
        lines.push(format!("IOP: {}", iop_parts.join(", ")));
    }

    for (label, refraction) in [
        ("OD", &exam.refraction.right_eye),
        ("OS", &exam.refraction.left_eye),
    ] {
        let mut parts = Vec::new();
        if let Some(sph) = refraction.sphere {
            parts.push(format!("sph {sph:+.2}"));
        }
        if let Some(cyl) = refraction.cylinder {
            parts.push(format!("cyl {cyl:+.2}"));
        }
        if let Some(axis) = refraction.axis {
            parts.push(format!("axis {axis:.0}"));
        }
        if let Some(add) = refraction.add {
            parts.push(format!("add {add:+.2}"));
        }
        if !parts.is_empty() {
            lines.push(format!("Refraction {label}: {}", parts.join(" ")));
        }
    }

    if let Some(seg) = exam.anterior_segment.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(format!("Anterior segment: {}", seg.trim()));
    }
    if let Some(seg) = exam.posterior_segment.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(format!("Posterior segment: {}", seg.trim()));
    }

    lines.join("\n")
}

fn compose_plan(exam: &Examination) -> String {
    let plan = exam.plan.trim();
    let follow_up = exam.follow_up.trim();
    match (plan.is_empty(), follow_up.is_empty()) {
        (false, false) => format!("{plan}\nReturn to clinic: {follow_up}"),
        (false, true) => plan.to_string(),
        (true, false) => format!("Return to clinic: {follow_up}"),
        (true, true) => String::new(),
    }
}

/// Split a diagnosis entry of the form "CODE - description".
///
/// Entries without the separator become description-only codes; the entry is
/// never discarded.
pub fn parse_icd_entry(entry: &str) -> IcdCode {
    match entry.split_once(" - ") {
        Some((code, description)) => IcdCode {
            code: code.trim().to_string(),
            description: description.trim().to_string(),
        },
        None => IcdCode {
            code: String::new(),
            description: entry.trim().to_string(),
        },
    }
}
