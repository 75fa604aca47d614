//! Custom Askama template filters for the admin layout.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Uppercase first letter of an email or name, for the avatar badge.
///
/// Usage in templates: `{{ layout.admin_email|initial }}`
#[askama::filter_fn]
pub fn initial(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(first_letter(&value.to_string()))
}

fn first_letter(value: &str) -> String {
    value
        .chars()
        .find(|c| c.is_alphanumeric())
        .map_or_else(|| "?".to_string(), |c| c.to_uppercase().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_letter() {
        assert_eq!(first_letter("ana@projetolummi.com.br"), "A");
        assert_eq!(first_letter("  érica"), "É");
        assert_eq!(first_letter(""), "?");
    }
}
