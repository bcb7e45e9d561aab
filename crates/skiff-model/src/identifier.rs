//! User-provided identifier checks.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum length of a user-provided identifier.
pub const MAX_IDENTIFIER_LENGTH: usize = 255;

/// ASCII letters, digits, underscores, dashes and dots.
static GOOD_IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_\-.]+$").unwrap_or_else(|_| unreachable!()));

/// Returns true if `value` is a legal identifier for roles, environments,
/// job names, tiers and user names.
///
/// Only ASCII is accepted, so the byte length checked here is also the
/// character count.
#[must_use]
pub fn is_good_identifier(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_IDENTIFIER_LENGTH
        && GOOD_IDENTIFIER_REGEX.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("www-data" ; "dash")]
    #[test_case("prod.east" ; "dot")]
    #[test_case("job_1" ; "underscore and digit")]
    fn accepts_good_identifiers(value: &str) {
        assert!(is_good_identifier(value));
    }

    #[test_case("" ; "empty")]
    #[test_case("has space" ; "space")]
    #[test_case("a/b" ; "slash")]
    #[test_case("semi;colon" ; "semicolon")]
    #[test_case("rôle" ; "accented letter")]
    #[test_case("prød" ; "nordic letter")]
    #[test_case("工作" ; "cjk")]
    #[test_case("job\u{0663}" ; "non ascii digit")]
    fn rejects_bad_identifiers(value: &str) {
        assert!(!is_good_identifier(value));
    }

    #[test]
    fn rejects_overlong_identifier() {
        let value = "a".repeat(MAX_IDENTIFIER_LENGTH + 1);
        assert!(!is_good_identifier(&value));
        assert!(is_good_identifier(&value[..MAX_IDENTIFIER_LENGTH]));
    }

    proptest! {
        #[test]
        fn prop_ascii_word_identifiers_pass(value in "[a-zA-Z0-9_.-]{1,64}") {
            prop_assert!(is_good_identifier(&value));
        }
    }
}
