//! Client-held state of one task-creation form.
//!
//! Created empty when the form opens for a selected flow and dropped on close
//! or after submission. The field schema is read-only.

use std::collections::HashMap;

use crate::types::FieldErrors;

use super::field::{FormValue, TaskFormField};
use super::submission::{build_submission, SubmissionBundle};
use super::title::detect_title_field;
use super::validate::validate_field;

/// Error key used for the free-text title input.
pub const TASK_NAME_KEY: &str = "taskName";

#[derive(Debug, Clone)]
pub struct FormSession {
    flow_id: String,
    fields: Vec<TaskFormField>,
    title_field: Option<String>,
    form_data: HashMap<String, FormValue>,
    task_name: String,
    errors: FieldErrors,
}

impl FormSession {
    pub fn new(flow_id: impl Into<String>, fields: Vec<TaskFormField>) -> Self {
        let title_field = detect_title_field(&fields).map(|f| f.name.clone());
        Self {
            flow_id: flow_id.into(),
            fields,
            title_field,
            form_data: HashMap::new(),
            task_name: String::new(),
            errors: FieldErrors::new(),
        }
    }

    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    pub fn fields(&self) -> &[TaskFormField] {
        &self.fields
    }

    /// Name of the form field that supplies the title, if one was detected.
    pub fn title_field(&self) -> Option<&str> {
        self.title_field.as_deref()
    }

    /// Whether the separate free-text title input must be shown.
    pub fn needs_title_input(&self) -> bool {
        self.title_field.is_none()
    }

    pub fn value(&self, name: &str) -> Option<&FormValue> {
        self.form_data.get(name)
    }

    /// Store a value and clear that field's error.
    pub fn set_value(&mut self, name: impl Into<String>, value: FormValue) {
        let name = name.into();
        self.errors.remove(&name);
        self.form_data.insert(name, value);
    }

    pub fn clear_value(&mut self, name: &str) {
        self.form_data.remove(name);
    }

    pub fn set_task_name(&mut self, task_name: impl Into<String>) {
        self.errors.remove(TASK_NAME_KEY);
        self.task_name = task_name.into();
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Validate every field and, when no title field exists, the title input.
    pub fn validate_form(&mut self) -> bool {
        self.errors.clear();

        for field in &self.fields {
            if let Some(message) = validate_field(field, self.form_data.get(&field.name)) {
                self.errors.insert(field.name.clone(), message);
            }
        }

        if self.needs_title_input() && self.task_name.trim().is_empty() {
            self.errors
                .insert(TASK_NAME_KEY.to_string(), "Task title is required".to_string());
        }

        self.errors.is_empty()
    }

    /// Title from the detected field, else from the free-text input.
    pub fn resolved_title(&self) -> Option<String> {
        let raw = match &self.title_field {
            Some(name) => self.form_data.get(name).and_then(FormValue::as_text),
            None => Some(self.task_name.as_str()),
        };
        raw.map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
    }

    /// Build the payload from the current values. Call after `validate_form`.
    pub fn build_submission(&self) -> SubmissionBundle {
        build_submission(
            &self.flow_id,
            &self.fields,
            &self.form_data,
            self.resolved_title(),
        )
    }
}
