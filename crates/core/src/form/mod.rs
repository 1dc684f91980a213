//! Dynamic task forms: schema, validation, title detection and the
//! submission payload builder. Pure logic, no network access.

pub mod field;
pub mod session;
pub mod submission;
pub mod title;
pub mod validate;

pub use field::{Attachment, FieldOption, FieldType, FieldValidation, FormValue, TaskFormField};
pub use session::{FormSession, TASK_NAME_KEY};
pub use submission::{build_submission, SubmissionBundle, SubmissionField, TaskSubmission};
pub use title::detect_title_field;
pub use validate::validate_field;
