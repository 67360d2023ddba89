//! Fixed-condition evaluator.
//!
//! Decides whether the workspace issue a message talks about has been fixed,
//! by matching the message text to a rule and the rule against the snapshot.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

/// Rule chosen for a message text. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixRule {
    /// Image needs a non-empty alt attribute.
    ImageAlt,
    /// Input needs email type, a pattern, or required.
    InputValidation,
    /// Login form needs a password input.
    PasswordInput,
    /// Links must use https.
    SecureScheme,
}

impl FixRule {
    const ORDER: [Self; 4] = [
        Self::ImageAlt,
        Self::InputValidation,
        Self::PasswordInput,
        Self::SecureScheme,
    ];

    /// Keyword looked for (case-insensitively) in the message text.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::ImageAlt => "alt",
            Self::InputValidation => "validation",
            Self::PasswordInput => "user login",
            Self::SecureScheme => "secure",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImageAlt => "image_alt",
            Self::InputValidation => "input_validation",
            Self::PasswordInput => "password_input",
            Self::SecureScheme => "secure_scheme",
        }
    }

    /// First rule whose keyword appears in `text`.
    pub fn for_text(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        Self::ORDER
            .into_iter()
            .find(|rule| lowered.contains(rule.keyword()))
    }

    /// Whether the snapshot satisfies this rule.
    pub fn is_satisfied_by(&self, snapshot: &str) -> bool {
        let pattern: &Regex = match self {
            Self::ImageAlt => &IMAGE_ALT,
            Self::InputValidation => &INPUT_VALIDATION,
            Self::PasswordInput => &PASSWORD_INPUT,
            Self::SecureScheme => &SECURE_SCHEME,
        };
        pattern.is_match(snapshot)
    }
}

impl fmt::Display for FixRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn case_insensitive(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .expect("fix rule pattern must compile")
}

static IMAGE_ALT: LazyLock<Regex> =
    LazyLock::new(|| case_insensitive(r#"<img[^>]+alt=["'][^"']+["'][^>]*>"#));

static INPUT_VALIDATION: LazyLock<Regex> = LazyLock::new(|| {
    case_insensitive(r#"<input[^>]+(type=["']email["']|pattern=|required)"#)
});

// Matched case-sensitively on the snapshot.
static PASSWORD_INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<input[^>]+type=["']password["']"#).expect("fix rule pattern must compile")
});

static SECURE_SCHEME: LazyLock<Regex> = LazyLock::new(|| case_insensitive(r"https://"));

/// Whether the issue named by `text` is fixed in `snapshot`.
///
/// Total and side-effect free. An empty snapshot is never fixed, and a text
/// that matches no rule is never fixed.
pub fn is_fixed(text: &str, snapshot: &str) -> bool {
    if snapshot.is_empty() {
        return false;
    }
    FixRule::for_text(text).is_some_and(|rule| rule.is_satisfied_by(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot_is_never_fixed() {
        assert!(!is_fixed("fix alt in img1", ""));
        assert!(!is_fixed("fix secure database", ""));
    }

    #[test]
    fn test_rule_selection() {
        assert_eq!(FixRule::for_text("fix alt in img1"), Some(FixRule::ImageAlt));
        assert_eq!(
            FixRule::for_text("fix input validation"),
            Some(FixRule::InputValidation)
        );
        assert_eq!(FixRule::for_text("fix user login"), Some(FixRule::PasswordInput));
        assert_eq!(
            FixRule::for_text("fix secure database"),
            Some(FixRule::SecureScheme)
        );
        assert_eq!(FixRule::for_text("Dinner is ready!"), None);
    }

    #[test]
    fn test_rule_selection_is_case_insensitive() {
        assert_eq!(FixRule::for_text("Fix ALT text"), Some(FixRule::ImageAlt));
        assert_eq!(FixRule::for_text("USER LOGIN broken"), Some(FixRule::PasswordInput));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // "alt" outranks "secure"; an https link alone does not satisfy it.
        let text = "secure the alt text";
        assert_eq!(FixRule::for_text(text), Some(FixRule::ImageAlt));
        assert!(!is_fixed(text, r#"<a href="https://example.com">x</a>"#));
        assert!(is_fixed(text, r#"<img src="a.png" alt="logo">"#));
    }

    #[test]
    fn test_image_alt() {
        assert!(is_fixed("fix alt in img1", r#"<img alt="x">"#));
        assert!(is_fixed("fix alt in img1", "<IMG src='a.png' ALT='cat' />"));
        assert!(!is_fixed("fix alt in img1", r#"<img alt="">"#));
        assert!(!is_fixed("fix alt in img1", r#"<img src="a.png">"#));
    }

    #[test]
    fn test_input_validation() {
        assert!(is_fixed("fix input validation", r#"<input type="email">"#));
        assert!(is_fixed("fix input validation", r#"<input name="zip" pattern="\d{5}">"#));
        assert!(is_fixed("fix input validation", r#"<input name="n" required>"#));
        assert!(!is_fixed("fix input validation", r#"<input type="text">"#));
    }

    #[test]
    fn test_password_input_is_case_sensitive_on_snapshot() {
        assert!(is_fixed("fix user login", r#"<input type="password">"#));
        assert!(!is_fixed("fix user login", r#"<INPUT TYPE="PASSWORD">"#));
        assert!(!is_fixed("fix user login", r#"<input type="text">"#));
    }

    #[test]
    fn test_secure_scheme() {
        assert!(is_fixed("fix secure database", "connect to HTTPS://db.local"));
        assert!(!is_fixed("fix secure database", "connect to http://db.local"));
    }

    #[test]
    fn test_unmatched_text_is_never_fixed() {
        assert!(!is_fixed("Take a short break!", "<img alt=\"x\"> https://"));
    }
}
