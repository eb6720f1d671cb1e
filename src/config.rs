//! Interception configuration.
//!
//! Values are validated lazily: a setting is only checked when a message
//! actually needs it, so a bad value for an unused mechanism never raises.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::error::{ConfigError, Error, Result};
use crate::message::SmsMessage;
use crate::rules::Rule;

/// Caller-supplied function deriving a target from the message.
pub type TargetFn = Arc<dyn Fn(&SmsMessage<'_>) -> String + Send + Sync>;

/// Literal value, or a value derived from the message at the point of use.
#[derive(Clone)]
pub enum Target {
    Literal(String),
    Derived(TargetFn),
    /// A loaded value that is neither a string nor a function.
    Unsupported(String),
}

impl Target {
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&SmsMessage<'_>) -> String + Send + Sync + 'static,
    {
        Self::Derived(Arc::new(f))
    }

    fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Some(Self::Literal(s)),
            other => Some(Self::Unsupported(other.to_string())),
        }
    }
}

impl From<&str> for Target {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for Target {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Derived(_) => f.write_str("Derived(..)"),
            Self::Unsupported(raw) => f.debug_tuple("Unsupported").field(raw).finish(),
        }
    }
}

/// What to do with a message that is not going to an internal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptMechanism {
    /// Send it to a different phone number instead.
    Redirect,
    /// Email it and don't send the SMS.
    Email,
    /// Drop it.
    Discard,
}

impl InterceptMechanism {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redirect => "redirect",
            Self::Email => "email",
            Self::Discard => "discard",
        }
    }
}

impl fmt::Display for InterceptMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterceptMechanism {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "redirect" => Ok(Self::Redirect),
            "email" => Ok(Self::Email),
            "discard" => Ok(Self::Discard),
            other => Err(Error::invalid(
                "intercept_mechanism",
                "one of redirect, email or discard",
                other,
            )),
        }
    }
}

/// Process-wide interception settings. Build once at startup.
#[derive(Debug, Clone, Default)]
pub struct InterceptConfig {
    /// Recipients that are never intercepted.
    pub internal_phone_numbers: Vec<Rule>,
    /// Raw mechanism name, parsed when a message is intercepted.
    pub intercept_mechanism: Option<String>,
    /// Where redirected messages go.
    pub redirect_target: Option<Target>,
    /// Who receives emailed messages.
    pub email_target: Option<Target>,
    /// Artificial latency for discarded messages.
    pub discard_delay: Option<Duration>,
}

impl InterceptConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internal_number(mut self, rule: impl Into<Rule>) -> Self {
        self.internal_phone_numbers.push(rule.into());
        self
    }

    pub fn with_internal_numbers<I, R>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Rule>,
    {
        self.internal_phone_numbers
            .extend(rules.into_iter().map(Into::into));
        self
    }

    pub fn with_mechanism(mut self, mechanism: InterceptMechanism) -> Self {
        self.intercept_mechanism = Some(mechanism.as_str().to_string());
        self
    }

    /// Set the mechanism by name. Unknown names fail on first interception.
    pub fn with_mechanism_name(mut self, name: impl Into<String>) -> Self {
        self.intercept_mechanism = Some(name.into());
        self
    }

    pub fn with_redirect_target(mut self, target: impl Into<Target>) -> Self {
        self.redirect_target = Some(target.into());
        self
    }

    pub fn with_email_target(mut self, target: impl Into<Target>) -> Self {
        self.email_target = Some(target.into());
        self
    }

    pub fn with_discard_delay(mut self, delay: Duration) -> Self {
        self.discard_delay = Some(delay);
        self
    }

    /// Parse the configured mechanism.
    pub fn mechanism(&self) -> Result<InterceptMechanism> {
        match &self.intercept_mechanism {
            Some(name) => name.parse(),
            None => Err(Error::invalid(
                "intercept_mechanism",
                "one of redirect, email or discard",
                "(not set)",
            )),
        }
    }

    /// Build config from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup, using the `SMS_SAFE_*` variable names.
    ///
    /// - `SMS_SAFE_INTERNAL_NUMBERS`: comma-separated, `/.../` entries are patterns
    /// - `SMS_SAFE_INTERCEPT_MECHANISM`: `redirect`, `email` or `discard`
    /// - `SMS_SAFE_REDIRECT_TARGET`, `SMS_SAFE_EMAIL_TARGET`
    /// - `SMS_SAFE_DISCARD_DELAY_MS`
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let internal_phone_numbers = lookup("SMS_SAFE_INTERNAL_NUMBERS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Rule::parse)
            .collect();

        let discard_delay = lookup("SMS_SAFE_DISCARD_DELAY_MS").and_then(|raw| {
            match raw.trim().parse::<f64>() {
                Ok(ms) => delay_from_millis(ms),
                Err(_) => {
                    warn!(value = %raw, "Ignoring unparseable SMS_SAFE_DISCARD_DELAY_MS");
                    None
                }
            }
        });

        Self {
            internal_phone_numbers,
            intercept_mechanism: lookup("SMS_SAFE_INTERCEPT_MECHANISM"),
            redirect_target: lookup("SMS_SAFE_REDIRECT_TARGET").map(Target::Literal),
            email_target: lookup("SMS_SAFE_EMAIL_TARGET").map(Target::Literal),
            discard_delay,
        }
    }

    /// Build config from a JSON document.
    ///
    /// Only a malformed document fails here. Settings of the wrong shape are
    /// kept and reported when consulted.
    pub fn from_json(json: &str) -> std::result::Result<Self, ConfigError> {
        let raw: RawSettings = serde_json::from_str(json)?;
        Ok(raw.into())
    }

    /// Read and parse a JSON configuration file.
    pub fn from_json_file(
        path: impl AsRef<std::path::Path>,
    ) -> std::result::Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Delay in (possibly fractional) milliseconds. Non-positive means no delay.
fn delay_from_millis(ms: f64) -> Option<Duration> {
    if ms.is_finite() && ms > 0.0 {
        Some(Duration::from_micros((ms * 1000.0).round() as u64))
    } else {
        None
    }
}

/// Only read when a document is loaded; a value of the wrong shape is
/// dropped with a warning instead of failing the whole document.
fn delay_from_json(value: Value) -> Option<Duration> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64().and_then(delay_from_millis),
        other => {
            warn!(value = %other, "Ignoring discard_delay that is not a number of milliseconds");
            None
        }
    }
}

/// Settings as they appear in a JSON document.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    internal_phone_numbers: Value,
    intercept_mechanism: Value,
    redirect_target: Value,
    email_target: Value,
    discard_delay: Value,
}

impl From<RawSettings> for InterceptConfig {
    fn from(raw: RawSettings) -> Self {
        let internal_phone_numbers = match raw.internal_phone_numbers {
            Value::Null => Vec::new(),
            Value::Array(items) => items.into_iter().map(rule_from_json).collect(),
            single => vec![rule_from_json(single)],
        };

        let intercept_mechanism = match raw.intercept_mechanism {
            Value::Null => None,
            Value::String(name) => Some(name),
            other => Some(other.to_string()),
        };

        Self {
            internal_phone_numbers,
            intercept_mechanism,
            redirect_target: Target::from_json(raw.redirect_target),
            email_target: Target::from_json(raw.email_target),
            discard_delay: delay_from_json(raw.discard_delay),
        }
    }
}

fn rule_from_json(value: Value) -> Rule {
    match value {
        Value::String(s) => Rule::parse(&s),
        other => Rule::Unsupported(other.to_string()),
    }
}
