//! Per-field validation. Pure logic; the first failing rule wins.

use regex::Regex;

use super::field::{FormValue, TaskFormField};

/// Validate one field value. Returns the error message, or `None` when valid.
///
/// Rules run in order: required, minimum length, maximum length, pattern.
/// Length and pattern rules only apply to non-empty text values.
pub fn validate_field(field: &TaskFormField, value: Option<&FormValue>) -> Option<String> {
    let present = value.filter(|v| !v.is_empty());

    let Some(value) = present else {
        return field
            .required
            .then(|| format!("{} is required", field.label));
    };

    let (Some(rules), Some(text)) = (field.validation.as_ref(), value.as_text()) else {
        return None;
    };

    let custom = |fallback: String| rules.message.clone().unwrap_or(fallback);
    let length = text.chars().count();

    if let Some(min) = rules.min {
        if length < min {
            return Some(custom(format!(
                "{} must have at least {min} characters",
                field.label
            )));
        }
    }

    if let Some(max) = rules.max {
        if length > max {
            return Some(custom(format!(
                "{} must have at most {max} characters",
                field.label
            )));
        }
    }

    if let Some(pattern) = rules.pattern.as_deref().filter(|p| !p.is_empty()) {
        match Regex::new(pattern) {
            Ok(re) if !re.is_match(text) => {
                return Some(custom(format!("{} has an invalid format", field.label)));
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(field = %field.name, pattern, error = %e, "Ignoring invalid field pattern");
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::field::{FieldType, FieldValidation};

    fn text(s: &str) -> FormValue {
        FormValue::Text(s.to_string())
    }

    fn field_with(required: bool, validation: Option<FieldValidation>) -> TaskFormField {
        let mut field = TaskFormField::new("code", "Code", FieldType::Text);
        field.required = required;
        field.validation = validation;
        field
    }

    #[test]
    fn required_empty_string_fails() {
        let field = field_with(true, None);
        assert_eq!(
            validate_field(&field, Some(&text(""))),
            Some("Code is required".to_string())
        );
        assert!(validate_field(&field, None).is_some());
    }

    #[test]
    fn required_empty_selection_fails() {
        let mut field = field_with(true, None);
        field.field_type = FieldType::MultipleChoice;
        assert!(validate_field(&field, Some(&FormValue::Many(vec![]))).is_some());
    }

    #[test]
    fn optional_empty_value_passes() {
        let field = field_with(
            false,
            Some(FieldValidation {
                min: Some(5),
                ..Default::default()
            }),
        );
        assert_eq!(validate_field(&field, Some(&text(""))), None);
    }

    #[test]
    fn min_length_fails_for_short_value() {
        let field = field_with(
            false,
            Some(FieldValidation {
                min: Some(5),
                ..Default::default()
            }),
        );
        assert!(validate_field(&field, Some(&text("abc"))).is_some());
        assert_eq!(validate_field(&field, Some(&text("abcde"))), None);
    }

    #[test]
    fn max_length_counts_characters_not_bytes() {
        let field = field_with(
            false,
            Some(FieldValidation {
                max: Some(4),
                ..Default::default()
            }),
        );
        assert_eq!(validate_field(&field, Some(&text("ação"))), None);
        assert!(validate_field(&field, Some(&text("ações"))).is_some());
    }

    #[test]
    fn pattern_mismatch_uses_custom_message() {
        let field = field_with(
            false,
            Some(FieldValidation {
                pattern: Some(r"^\d{3}$".into()),
                message: Some("Three digits".into()),
                ..Default::default()
            }),
        );
        assert_eq!(
            validate_field(&field, Some(&text("12a"))),
            Some("Three digits".to_string())
        );
        assert_eq!(validate_field(&field, Some(&text("123"))), None);
    }

    #[test]
    fn first_failing_rule_wins() {
        let field = field_with(
            true,
            Some(FieldValidation {
                min: Some(5),
                pattern: Some(r"^\d+$".into()),
                ..Default::default()
            }),
        );
        let message = validate_field(&field, Some(&text("ab"))).unwrap();
        assert!(message.contains("at least 5"), "got {message}");
    }

    #[test]
    fn invalid_pattern_is_ignored() {
        let field = field_with(
            false,
            Some(FieldValidation {
                pattern: Some("(".into()),
                ..Default::default()
            }),
        );
        assert_eq!(validate_field(&field, Some(&text("anything"))), None);
    }
}
