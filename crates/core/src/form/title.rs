//! Locate the form field that holds the task title.
//!
//! A field flagged `isTitle` always wins. Otherwise the label and then the
//! name are compared against [`TITLE_KEYWORDS`] case- and accent-insensitively.
//! Strong keywords also match as a prefix (`Título da solicitação`); weak
//! ones (`nome`, `name`) only match exactly.

use super::field::TaskFormField;

/// Keywords that may appear as the leading words of a title label.
pub const TITLE_KEYWORDS: &[&str] = &[
    "titulo",
    "title",
    "assunto",
    "subject",
    "nome da tarefa",
    "task name",
];

/// Keywords that only count on an exact match.
pub const WEAK_TITLE_KEYWORDS: &[&str] = &["nome", "name"];

/// Lowercase and fold Portuguese diacritics to ASCII.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            '_' | '-' => ' ',
            other => other,
        })
        .collect()
}

fn matches_keyword(text: &str) -> bool {
    let text = normalize_label(text);
    if text.is_empty() {
        return false;
    }
    let strong = TITLE_KEYWORDS.iter().any(|keyword| {
        text == *keyword
            || text
                .strip_prefix(keyword)
                .is_some_and(|rest| rest.starts_with(' ') || rest.starts_with(':'))
    });
    strong || WEAK_TITLE_KEYWORDS.contains(&text.as_str())
}

/// Whether a single field looks like the title field.
pub fn is_title_field(field: &TaskFormField) -> bool {
    field.field_type.is_textual() && (matches_keyword(&field.label) || matches_keyword(&field.name))
}

/// Find the title field: explicit flag first, then keyword match.
pub fn detect_title_field(fields: &[TaskFormField]) -> Option<&TaskFormField> {
    fields
        .iter()
        .find(|f| f.is_title)
        .or_else(|| fields.iter().find(|f| is_title_field(f)))
}
