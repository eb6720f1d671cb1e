//! Recipient matching rules.
//!
//! A message whose recipient matches any configured rule is going to an
//! internal number and passes through untouched. Everything else is
//! intercepted, so an empty rule set intercepts every message.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::message::SmsMessage;

/// Caller-supplied predicate over a message.
///
/// Any side effects inside the closure are the caller's responsibility.
pub type MessagePredicate = Arc<dyn Fn(&SmsMessage<'_>) -> bool + Send + Sync>;

/// A single internal-number rule.
#[derive(Clone)]
pub enum Rule {
    /// Exact, case-sensitive match against the recipient.
    Literal(String),
    /// Regex tested anywhere within the recipient.
    Pattern(Regex),
    /// Arbitrary predicate over the whole message.
    Predicate(MessagePredicate),
    /// A loaded value that is none of the above. Fails when evaluated.
    Unsupported(String),
}

impl Rule {
    pub fn literal(number: impl Into<String>) -> Self {
        Self::Literal(number.into())
    }

    pub fn pattern(regex: Regex) -> Self {
        Self::Pattern(regex)
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&SmsMessage<'_>) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(f))
    }

    /// Parse a rule from its textual form.
    ///
    /// `/.../` is a regex pattern, anything else is a literal number. A pattern
    /// that fails to compile is kept as `Unsupported` so the error surfaces
    /// only when a message is actually checked against it. `raw` is used
    /// verbatim; callers splitting delimited lists trim the pieces themselves.
    pub fn parse(raw: &str) -> Self {
        if raw.len() >= 2 && raw.starts_with('/') && raw.ends_with('/') {
            match Regex::new(&raw[1..raw.len() - 1]) {
                Ok(regex) => Self::Pattern(regex),
                Err(_) => Self::Unsupported(raw.to_string()),
            }
        } else {
            Self::Literal(raw.to_string())
        }
    }

    /// Whether this rule marks the message's recipient as internal.
    pub fn matches(&self, message: &SmsMessage<'_>) -> Result<bool> {
        match self {
            Self::Literal(number) => Ok(message.to == *number),
            Self::Pattern(regex) => Ok(regex.is_match(&message.to)),
            Self::Predicate(f) => Ok(f(message)),
            Self::Unsupported(raw) => Err(Error::invalid(
                "internal_phone_numbers",
                "a literal number, a /pattern/ or a predicate (or a list of them)",
                raw.clone(),
            )),
        }
    }
}

impl From<&str> for Rule {
    fn from(number: &str) -> Self {
        Self::Literal(number.to_string())
    }
}

impl From<String> for Rule {
    fn from(number: String) -> Self {
        Self::Literal(number)
    }
}

impl From<Regex> for Rule {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(number) => f.debug_tuple("Literal").field(number).finish(),
            Self::Pattern(regex) => f.debug_tuple("Pattern").field(&regex.as_str()).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
            Self::Unsupported(raw) => f.debug_tuple("Unsupported").field(raw).finish(),
        }
    }
}

/// Decide whether `message` must be intercepted.
///
/// Rules are evaluated in configured order and stop at the first match.
/// Returns `true` when no rule matches.
pub fn should_intercept(message: &SmsMessage<'_>, rules: &[Rule]) -> Result<bool> {
    for rule in rules {
        if rule.matches(message)? {
            debug!(to = %message.to, rule = ?rule, "Recipient matched internal number rule");
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn check(rules: &[Rule], numbers: &[&str], expected: bool) {
        for number in numbers {
            let native = ();
            let msg = SmsMessage::new(*number, *number, "Foo", &native);
            assert_eq!(
                should_intercept(&msg, rules).unwrap(),
                expected,
                "number {number}"
            );
        }
    }

    #[test]
    fn empty_rules_intercept_everything() {
        check(&[], &["+447111222221", "5551234", ""], true);
    }

    #[test]
    fn literal_rule_is_exact() {
        let rules = vec![Rule::from("+447111222222")];
        check(&rules, &["+447111222222"], false);
        check(&rules, &["+447111222221", "447111222222", "+447111222222 "], true);
    }

    #[test]
    fn pattern_rule_matches_anywhere() {
        let rules = vec![Rule::from(Regex::new(r"7111").unwrap())];
        check(&rules, &["+447111222222", "7111"], false);
        check(&rules, &["+447222111333"], true);
    }

    #[test]
    fn anchored_pattern_rule() {
        let rules = vec![Rule::parse(r"/^\+44/")];
        check(&rules, &["+447111222222"], false);
        check(&rules, &["0044711122222", "+1555"], true);
    }

    #[test]
    fn predicate_rule_sees_message() {
        let rules = vec![Rule::predicate(|m| m.to.ends_with("22"))];
        check(&rules, &["+447111222222"], false);
        check(&rules, &["+447111222223"], true);
    }

    #[test]
    fn mixed_rules_use_or() {
        let rules = vec![
            Rule::from("+447111222221"),
            Rule::parse("/^\\+1/"),
            Rule::predicate(|m| m.to == "999"),
        ];
        check(&rules, &["+447111222221", "+15551234", "999"], false);
        check(&rules, &["+447111222223", "998"], true);
    }

    #[test]
    fn unsupported_rule_fails_with_offending_value() {
        let native = ();
        let msg = SmsMessage::new("a", "b", "c", &native);
        let rules = vec![Rule::parse("/[unclosed/")];
        match should_intercept(&msg, &rules) {
            Err(Error::InvalidConfiguration { setting, value, .. }) => {
                assert_eq!(setting, "internal_phone_numbers");
                assert_eq!(value, "/[unclosed/");
            }
            other => panic!("Expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn evaluation_stops_at_first_match() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let rules = vec![
            Rule::from("123"),
            Rule::predicate(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            }),
        ];
        check(&rules, &["123"], false);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        check(&rules, &["456"], true);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn parse_keeps_literal_padding() {
        assert!(matches!(Rule::parse(" 5551234"), Rule::Literal(ref n) if n == " 5551234"));

        let native = ();
        let msg = SmsMessage::new("A", "5551234", "hi", &native);
        assert!(should_intercept(&msg, &[Rule::parse(" 5551234")]).unwrap());
        assert!(!should_intercept(&msg, &[Rule::parse("5551234")]).unwrap());
    }

    #[test]
    fn parse_recognises_patterns() {
        assert!(matches!(Rule::parse("/"), Rule::Literal(_)));
        assert!(matches!(Rule::parse("/55/"), Rule::Pattern(_)));
    }
}
