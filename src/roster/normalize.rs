use crate::{
    config::{FieldHeaders, SheetHeaders},
    data::student::Student,
};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Marks a row whose name could not be resolved; such rows are filtered out.
pub const NO_NAME_SENTINEL: &str = "Unnamed Student";

pub const DEFAULT_CLASS: &str = "general";

// The characters encodeURIComponent leaves unescaped, beyond alphanumerics.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Resolves one semantic field from a raw row, tolerating header variance.
///
/// Lookup order: exact canonical key, then case-insensitive trimmed match
/// against the canonical key, then exact trimmed match against the fallback
/// (localized) key. A match only counts if its trimmed value is non-empty;
/// otherwise resolution continues, and the field resolves to `""` when every
/// strategy comes up empty.
#[must_use]
pub fn resolve_field(row: &[(String, String)], canonical: &str, fallback: Option<&str>) -> String {
    if let Some((_, value)) = row.iter().find(|(key, _)| key.as_str() == canonical) {
        let value = value.trim();
        if !value.is_empty() {
            return value.to_string();
        }
    }

    let lowered = canonical.to_lowercase();
    if let Some((_, value)) = row
        .iter()
        .find(|(key, _)| key.trim().to_lowercase() == lowered)
    {
        let value = value.trim();
        if !value.is_empty() {
            return value.to_string();
        }
    }

    if let Some(fallback) = fallback {
        if let Some((_, value)) = row.iter().find(|(key, _)| key.trim() == fallback) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    String::new()
}

/// Builds a `Student` from a raw row, applying the per-field defaults:
/// sentinel name, `"general"` class, and a generated avatar URL when the
/// source has no image.
#[must_use]
pub fn normalize_row(
    row: &[(String, String)],
    index: usize,
    headers: &SheetHeaders,
    avatar_base_url: &str,
) -> Student {
    let resolve =
        |field: &FieldHeaders| resolve_field(row, &field.canonical, field.fallback.as_deref());

    let mut full_name = resolve(&headers.full_name);
    if full_name.is_empty() {
        full_name = NO_NAME_SENTINEL.to_string();
    }

    let phone_number = resolve(&headers.phone);

    let mut image_url = resolve(&headers.image);
    if image_url.is_empty() {
        image_url = format!(
            "{avatar_base_url}{}",
            utf8_percent_encode(&full_name, URI_COMPONENT)
        );
    }

    let mut class = resolve(&headers.class);
    if class.is_empty() {
        class = DEFAULT_CLASS.to_string();
    }

    let notes = resolve(&headers.notes);

    Student {
        id: derive_id(&phone_number, index),
        full_name,
        phone_number,
        image_url,
        class,
        notes,
    }
}

/// Digits-only phone number, or `student-{index}` when the phone strips to
/// nothing. Positional ids never collide; equal phones collide by design.
#[must_use]
pub fn derive_id(phone: &str, index: usize) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        format!("student-{index}")
    } else {
        digits
    }
}
