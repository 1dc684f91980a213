use std::collections::BTreeMap;

/// Client-side temporary participant id, unique within one signature request.
pub type TempId = String;

/// Stable identity of a single placed rectangle.
pub type PositionId = uuid::Uuid;

/// Key of a document inside the active document set.
pub type DocKey = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Field-keyed validation messages, first failing rule per field.
pub type FieldErrors = BTreeMap<String, String>;
