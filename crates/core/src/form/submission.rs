//! Build the `POST /tasks` request payload from form data.
//!
//! The JSON part uses the backend's PascalCase names:
//! `{ "Name", "FlowId", "Fields": [{ "FieldId", "Values" }] }`. Attachment
//! bytes travel as separate multipart parts; their field entries carry an
//! empty value list.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::field::{Attachment, FieldType, FormValue, TaskFormField};

/// Output format for `DATE` fields.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Output format for `DATETIME` fields.
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

const DATE_TIME_INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubmissionField {
    pub field_id: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskSubmission {
    pub name: Option<String>,
    pub flow_id: String,
    pub fields: Vec<SubmissionField>,
}

/// A file to send as a multipart `files` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionAttachment {
    pub field_id: String,
    pub attachment: Attachment,
}

/// Everything `POST /tasks` needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionBundle {
    pub request: TaskSubmission,
    pub attachments: Vec<SubmissionAttachment>,
}

/// Parse a user-entered date; `None` for empty or invalid input.
///
/// ISO timestamps are accepted and truncated to their date.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .or_else(|| parse_date_time(input).map(|dt| dt.date()))
}

/// Parse a user-entered date-time; `None` for empty or invalid input.
pub fn parse_date_time(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_local());
    }
    DATE_TIME_INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
}

fn field_values(field: &TaskFormField, value: &FormValue) -> Option<Vec<String>> {
    match (field.field_type, value) {
        (FieldType::Date, FormValue::Text(s)) => {
            parse_date(s).map(|d| vec![d.format(DATE_FORMAT).to_string()])
        }
        (FieldType::DateTime, FormValue::Text(s)) => {
            parse_date_time(s).map(|dt| vec![dt.format(DATE_TIME_FORMAT).to_string()])
        }
        (FieldType::Date | FieldType::DateTime, _) => None,
        (FieldType::MultipleChoice, FormValue::Many(values)) => {
            let values: Vec<String> = values
                .iter()
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .collect();
            (!values.is_empty()).then_some(values)
        }
        (FieldType::Attachment, FormValue::File(_)) => Some(Vec::new()),
        (FieldType::Attachment, _) | (_, FormValue::File(_)) => None,
        (_, FormValue::Text(s)) => (!s.trim().is_empty()).then(|| vec![s.clone()]),
        (_, FormValue::Many(values)) => values
            .iter()
            .find(|v| !v.trim().is_empty())
            .map(|v| vec![v.clone()]),
    }
}

/// Build the submission for `flow_id` from declared fields and form data.
///
/// Fields without a backend id, without a value, or whose value cannot be
/// converted are left out of `Fields`.
pub fn build_submission(
    flow_id: &str,
    fields: &[TaskFormField],
    data: &HashMap<String, FormValue>,
    title: Option<String>,
) -> SubmissionBundle {
    let mut entries = Vec::with_capacity(fields.len());
    let mut attachments = Vec::new();

    for field in fields {
        let Some(value) = data.get(&field.name) else {
            continue;
        };
        let Some(field_id) = field.resolved_field_id() else {
            tracing::warn!(field = %field.name, "Dropping form field without a backend id");
            continue;
        };
        let Some(values) = field_values(field, value) else {
            tracing::debug!(field = %field.name, "Omitting empty or unparseable field value");
            continue;
        };

        if let FormValue::File(attachment) = value {
            attachments.push(SubmissionAttachment {
                field_id: field_id.to_string(),
                attachment: attachment.clone(),
            });
        }
        entries.push(SubmissionField {
            field_id: field_id.to_string(),
            values,
        });
    }

    SubmissionBundle {
        request: TaskSubmission {
            name: title,
            flow_id: flow_id.to_string(),
            fields: entries,
        },
        attachments,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
