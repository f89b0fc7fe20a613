//! opticore: encounter workflow and structured-field reconciliation engine
//! for an ophthalmology clinic EMR.
//!
//! The crate owns four things:
//! 1. the typed clinical records (Appointment, Examination, SOAP note) and
//!    their invariants (`models`),
//! 2. the flat field catalog and the path resolver that maps it onto the
//!    nested records (`fields`),
//! 3. the change-detection merge that folds externally-interpreted values
//!    back into a record without clobbering user data (`fields::reconcile`),
//! 4. the appointment/examination status state machine and the workflow
//!    triggers around it (`workflow`).
//!
//! Workflow logic is synchronous and operates on in-memory record values;
//! the SQLite layer in `db` and the Ollama client in `interpret` are the two
//! consumed capabilities the surrounding application wires in.

pub mod config;
pub mod models;
pub mod fields;
pub mod interpret;
pub mod workflow;
pub mod db;
