//! Prompt assembly for the interpretation backend.

use crate::fields::{stringify_value, FieldDescriptor, FieldKind};

/// Build the (system, user) prompt pair for a free-text interpretation call.
///
/// The system prompt lists every catalog field by id with its label, kind
/// and current value, and demands a single JSON object keyed by field id.
pub fn build_interpretation_prompt(
    catalog: &[FieldDescriptor],
    raw_text: &str,
    context: Option<&str>,
) -> (String, String) {
    let mut field_lines = String::new();
    for field in catalog {
        let current = stringify_value(&field.value);
        let current = if current.is_empty() { "(empty)" } else { &current };
        field_lines.push_str(&format!(
            "- {id}: {label} [{kind}] currently: {current}\n",
            id = field.id,
            label = field.label,
            kind = kind_name(field.kind),
        ));
    }

    let context_block = match context {
        Some(hint) if !hint.trim().is_empty() => {
            format!("\nCONTEXT: {}\n", hint.trim())
        }
        _ => String::new(),
    };

    let system = format!(
        r#"You are a clinical scribe assistant for an eye clinic. A doctor dictated a free-form description of an examination. Map it onto the structured fields below.

FIELDS:
{field_lines}{context_block}
Rules:
- Return ONLY a single JSON object, nothing else.
- Keys are field ids from the list above; include a key only when the dictation states or clearly implies a value for it.
- "OD" means right eye, "OS" means left eye, "OU" means both eyes.
- Visual acuity values keep their "20/40" form. Numeric fields are plain numbers.
- Diagnosis is a single comma-separated string, each entry optionally "CODE - description".
- Never invent a value the dictation does not support. Omit unknown fields entirely; do not emit empty strings or nulls."#
    );

    let user = format!("DICTATION:\n{}", raw_text.trim());

    (system, user)
}

fn kind_name(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Text => "text",
        FieldKind::Number => "number",
        FieldKind::Textarea => "textarea",
        FieldKind::Select => "select",
    }
}
