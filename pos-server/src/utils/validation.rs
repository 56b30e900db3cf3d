//! Input validation helpers
//!
//! Centralized text length constants and validation functions used where a
//! derive-based `validator` rule does not fit (path parameters, bot input,
//! cross-field rules).

use validator::{ValidationErrors, ValidationErrorsKind};

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: menu item, category, table, section, role, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, comments
pub const MAX_NOTE_LEN: usize = 500;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate that a monetary value is finite and non-negative.
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

/// Flattens `validator` errors into `field: code` pairs, nested paths joined by `.`
pub fn describe_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut out = Vec::new();
    collect(errors, "", &mut out);
    out.sort();
    out
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    out.push(format!("{path}: {}", e.code));
                }
            }
            ValidationErrorsKind::Struct(inner) => collect(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    collect(inner, &format!("{path}[{idx}]"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Line {
        #[validate(range(min = 1))]
        quantity: i32,
    }

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1))]
        name: String,
        #[validate(nested)]
        lines: Vec<Line>,
    }

    #[test]
    fn required_text_rejects_blank_and_long() {
        assert!(validate_required_text("Mesa 1", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
        assert!(validate_optional_text(&None, "note", MAX_NOTE_LEN).is_ok());
    }

    #[test]
    fn amount_must_be_finite() {
        assert!(validate_amount(0.0, "tip").is_ok());
        assert!(validate_amount(-1.0, "tip").is_err());
        assert!(validate_amount(f64::NAN, "tip").is_err());
    }

    #[test]
    fn nested_errors_are_flattened_with_paths() {
        let payload = Payload {
            name: String::new(),
            lines: vec![Line { quantity: 1 }, Line { quantity: 0 }],
        };
        let errors = payload.validate().unwrap_err();
        let described = describe_errors(&errors);
        assert_eq!(described, vec!["lines[1].quantity: range", "name: length"]);
    }
}
