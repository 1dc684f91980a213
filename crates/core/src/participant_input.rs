//! Inline validation for hand-entered (external) participants.

use validator::ValidateEmail;

use crate::types::FieldErrors;

/// Minimum length of a participant name after trimming.
pub const MIN_NAME_LENGTH: usize = 2;

/// Number of digits in a CPF.
pub const CPF_LENGTH: usize = 11;

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_CPF: &str = "cpf";

/// Strip everything except ASCII digits (`529.982.247-25` -> `52998224725`).
pub fn normalize_cpf(cpf: &str) -> String {
    cpf.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Check length, repeated-digit sequences and both mod-11 check digits.
pub fn is_valid_cpf(cpf: &str) -> bool {
    let digits: Vec<u32> = normalize_cpf(cpf)
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != CPF_LENGTH {
        return false;
    }
    if digits.iter().all(|d| *d == digits[0]) {
        return false;
    }

    check_digit(&digits[..9]) == digits[9] && check_digit(&digits[..10]) == digits[10]
}

fn check_digit(digits: &[u32]) -> u32 {
    let top_weight = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (top_weight - i as u32))
        .sum();
    match (sum * 10) % 11 {
        10 => 0,
        r => r,
    }
}

/// Validate the three identity fields of an external participant.
///
/// Returns an empty map when everything is valid.
pub fn validate_external_participant(name: &str, email: &str, cpf: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();

    let name = name.trim();
    if name.is_empty() {
        errors.insert(FIELD_NAME.into(), "Name is required".into());
    } else if name.chars().count() < MIN_NAME_LENGTH {
        errors.insert(
            FIELD_NAME.into(),
            format!("Name must have at least {MIN_NAME_LENGTH} characters"),
        );
    }

    let email = email.trim();
    if email.is_empty() {
        errors.insert(FIELD_EMAIL.into(), "Email is required".into());
    } else if !email.validate_email() {
        errors.insert(FIELD_EMAIL.into(), "Invalid email".into());
    }

    if cpf.trim().is_empty() {
        errors.insert(FIELD_CPF.into(), "CPF is required".into());
    } else if !is_valid_cpf(cpf) {
        errors.insert(FIELD_CPF.into(), "Invalid CPF".into());
    }

    errors
}
