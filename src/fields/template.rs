//! The legacy examination field catalog layout.
//!
//! Ordering and ids are load-bearing: the interpretation capability returns
//! a catalog of the same length and order, and the merge precondition checks
//! ids index-by-index. The two composite paths (`diagnosis`, the trailing-dot
//! IOP leaves) are kept exactly as the legacy layout spelled them.

use super::catalog::{FieldKind, FieldTemplate};

/// Addressable examination fields, in legacy catalog order.
pub fn examination_field_template() -> Vec<FieldTemplate> {
    vec![
        FieldTemplate {
            id: "chief_complaint",
            path: "chiefComplaint",
            kind: FieldKind::Textarea,
            label: "Chief Complaint",
        },
        FieldTemplate {
            id: "va_od_uncorrected",
            path: "vision.rightEye.uncorrected",
            kind: FieldKind::Text,
            label: "Right Eye Uncorrected VA",
        },
        FieldTemplate {
            id: "va_od_corrected",
            path: "vision.rightEye.corrected",
            kind: FieldKind::Text,
            label: "Right Eye Corrected VA",
        },
        FieldTemplate {
            id: "va_od_pinhole",
            path: "vision.rightEye.pinhole",
            kind: FieldKind::Text,
            label: "Right Eye Pinhole VA",
        },
        FieldTemplate {
            id: "va_os_uncorrected",
            path: "vision.leftEye.uncorrected",
            kind: FieldKind::Text,
            label: "Left Eye Uncorrected VA",
        },
        FieldTemplate {
            id: "va_os_corrected",
            path: "vision.leftEye.corrected",
            kind: FieldKind::Text,
            label: "Left Eye Corrected VA",
        },
        FieldTemplate {
            id: "va_os_pinhole",
            path: "vision.leftEye.pinhole",
            kind: FieldKind::Text,
            label: "Left Eye Pinhole VA",
        },
        FieldTemplate {
            id: "iop_od",
            path: "intraocularPressure.rightEye.",
            kind: FieldKind::Number,
            label: "Right Eye IOP (mmHg)",
        },
        FieldTemplate {
            id: "iop_os",
            path: "intraocularPressure.leftEye.",
            kind: FieldKind::Number,
            label: "Left Eye IOP (mmHg)",
        },
        FieldTemplate {
            id: "refraction_od_sphere",
            path: "refraction.rightEye.sphere",
            kind: FieldKind::Number,
            label: "Right Eye Sphere",
        },
        FieldTemplate {
            id: "refraction_od_cylinder",
            path: "refraction.rightEye.cylinder",
            kind: FieldKind::Number,
            label: "Right Eye Cylinder",
        },
        FieldTemplate {
            id: "refraction_od_axis",
            path: "refraction.rightEye.axis",
            kind: FieldKind::Number,
            label: "Right Eye Axis",
        },
        FieldTemplate {
            id: "refraction_od_add",
            path: "refraction.rightEye.add",
            kind: FieldKind::Number,
            label: "Right Eye Add",
        },
        FieldTemplate {
            id: "refraction_os_sphere",
            path: "refraction.leftEye.sphere",
            kind: FieldKind::Number,
            label: "Left Eye Sphere",
        },
        FieldTemplate {
            id: "refraction_os_cylinder",
            path: "refraction.leftEye.cylinder",
            kind: FieldKind::Number,
            label: "Left Eye Cylinder",
        },
        FieldTemplate {
            id: "refraction_os_axis",
            path: "refraction.leftEye.axis",
            kind: FieldKind::Number,
            label: "Left Eye Axis",
        },
        FieldTemplate {
            id: "refraction_os_add",
            path: "refraction.leftEye.add",
            kind: FieldKind::Number,
            label: "Left Eye Add",
        },
        FieldTemplate {
            id: "pupil_od_size",
            path: "pupils.rightEye.size",
            kind: FieldKind::Number,
            label: "Right Pupil Size (mm)",
        },
        FieldTemplate {
            id: "pupil_os_size",
            path: "pupils.leftEye.size",
            kind: FieldKind::Number,
            label: "Left Pupil Size (mm)",
        },
        FieldTemplate {
            id: "anterior_segment",
            path: "anteriorSegment",
            kind: FieldKind::Textarea,
            label: "Anterior Segment",
        },
        FieldTemplate {
            id: "posterior_segment",
            path: "posteriorSegment",
            kind: FieldKind::Textarea,
            label: "Posterior Segment",
        },
        FieldTemplate {
            id: "diagnosis",
            path: "diagnosis",
            kind: FieldKind::Textarea,
            label: "Diagnosis",
        },
        FieldTemplate {
            id: "plan",
            path: "plan",
            kind: FieldKind::Textarea,
            label: "Plan",
        },
        FieldTemplate {
            id: "follow_up",
            path: "followUp",
            kind: FieldKind::Select,
            label: "Follow Up",
        },
    ]
}
