//! Format checks for identifiers typed into forms.

use std::sync::LazyLock;

use regex::Regex;

/// French SIRET establishment number: exactly 14 digits.
static SIRET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{14}$").expect("Invalid regex pattern"));

/// Loose email shape: something, `@`, a domain with a dot.
static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex pattern")
});

/// Check a SIRET number. Surrounding whitespace is not tolerated.
#[must_use]
pub fn is_valid_siret(value: &str) -> bool {
    SIRET.is_match(value)
}

/// Check the general shape of an email address.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_siret() {
        assert!(is_valid_siret("12345678901234"));
        assert!(!is_valid_siret("1234567890123"));
        assert!(!is_valid_siret("123456789012345"));
        assert!(!is_valid_siret("1234567890123A"));
        assert!(!is_valid_siret("123 456 789 01234"));
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("jean.dupont@example.fr"));
        assert!(!is_valid_email("jean.dupont"));
        assert!(!is_valid_email("jean@localhost"));
        assert!(!is_valid_email("jean dupont@example.fr"));
    }
}
