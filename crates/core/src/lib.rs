//! Domain core of the signdesk client.
//!
//! Signature-request modelling (participants, groups, documents), the
//! signature/rubric position editor, dynamic task forms, and the session and
//! liveness primitives shared with the REST clients. No network access.

pub mod document;
pub mod editor;
pub mod error;
pub mod form;
pub mod group;
pub mod liveness;
pub mod participant;
pub mod participant_input;
pub mod position;
pub mod request;
pub mod session;
pub mod types;
