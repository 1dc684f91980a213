//! Workflow form schema as declared by the backend, and client-held values.

use serde::{Deserialize, Serialize};

/// Declared type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Text,
    Number,
    Date,
    #[serde(alias = "DATETIME")]
    DateTime,
    MultipleChoice,
    OnlyChoice,
    Attachment,
    /// Any other scalar type; submitted as a single string.
    #[serde(other)]
    Other,
}

impl FieldType {
    /// Types whose value is free text typed by the user.
    pub fn is_textual(&self) -> bool {
        matches!(self, Self::Text | Self::Other)
    }
}

/// Optional per-field rules.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldValidation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    pub label: String,
    pub value: String,
}

/// One field of a flow's form. Never mutated by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskFormField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Backend id used in the submission payload.
    #[serde(default, alias = "id", skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    /// Explicit marker that this field holds the task title.
    #[serde(default)]
    pub is_title: bool,
}

impl TaskFormField {
    pub fn new(name: impl Into<String>, label: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            field_type,
            required: false,
            validation: None,
            options: Vec::new(),
            field_id: None,
            is_title: false,
        }
    }

    /// The backend field id, if present and non-blank.
    pub fn resolved_field_id(&self) -> Option<&str> {
        self.field_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// A file picked for an `ATTACHMENT` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A value held in the client-side form data map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Many(Vec<String>),
    File(Attachment),
}

impl FormValue {
    /// Empty string (after trimming) or empty selection.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Many(values) => values.is_empty(),
            Self::File(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}
