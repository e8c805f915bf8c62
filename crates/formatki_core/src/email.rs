//! Email-list parsing for the submission form.

use crate::tags::split_tokens;
use regex::Regex;
use std::sync::LazyLock;

/// Permissive address shape: `local@domain.tld`, no whitespace, a single `@`.
static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Returns `true` when `candidate` has the shape of an email address.
pub fn looks_like_email(candidate: &str) -> bool {
    EMAIL_SHAPE.is_match(candidate)
}

/// Extract the syntactically valid addresses from a raw email field.
///
/// The field is split on `,` or `;`; each part is trimmed and kept only when it
/// passes [`looks_like_email`]. Order follows the input.
pub fn parse_email_list(raw: &str) -> Vec<String> {
    split_tokens(raw)
        .into_iter()
        .filter(|part| looks_like_email(part))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{looks_like_email, parse_email_list};

    #[test]
    fn keeps_only_valid_addresses_in_order() {
        assert_eq!(
            parse_email_list("x@y.com; bad , z@w.org"),
            vec!["x@y.com".to_string(), "z@w.org".to_string()]
        );
    }

    #[test]
    fn empty_or_separator_only_input_yields_nothing() {
        assert!(parse_email_list("").is_empty());
        assert!(parse_email_list(" ; , ").is_empty());
    }

    #[test]
    fn shape_check_matrix() {
        let cases = [
            ("jan.kowalski@obi.pl", true),
            ("a@b.c", true),
            ("no-at-sign.pl", false),
            ("two@@obi.pl", false),
            ("a@b@c.pl", false),
            ("spaced name@obi.pl", false),
            ("nodot@obi", false),
            ("@obi.pl", false),
        ];
        for (input, expected) in cases {
            assert_eq!(looks_like_email(input), expected, "input: {}", input);
        }
    }
}
