//! Canonical SMS message shared by every backend.

use std::fmt;

/// Backend-agnostic view of an outbound SMS.
///
/// Backend adapters build one of these from their native message type.
/// `original` borrows the native object so it can be rendered for diagnostics
/// (the email mechanism includes it in the notification body).
#[derive(Clone)]
pub struct SmsMessage<'a> {
    pub from: String,
    pub to: String,
    pub text: String,
    pub original: &'a dyn fmt::Debug,
}

impl<'a> SmsMessage<'a> {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
        original: &'a dyn fmt::Debug,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            text: text.into(),
            original,
        }
    }

    /// Copy of this message addressed to `target`.
    ///
    /// The text gets `" (SmsSafe: <original recipient>)"` appended; that
    /// annotation is the only record of where the message was headed.
    pub fn redirected(&self, target: impl Into<String>) -> SmsMessage<'a> {
        SmsMessage {
            from: self.from.clone(),
            to: target.into(),
            text: format!("{} (SmsSafe: {})", self.text, self.to),
            original: self.original,
        }
    }
}

impl fmt::Debug for SmsMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsMessage")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("text", &self.text)
            .field("original", self.original)
            .finish()
    }
}
