//! Library-neutral SMS struct, for applications that build their own sender.

use serde::{Deserialize, Serialize};

use crate::backends::BackendAdapter;
use crate::error::Result;
use crate::message::SmsMessage;

/// A plain outbound SMS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlainSms {
    pub from: String,
    pub to: String,
    pub text: String,
}

impl PlainSms {
    pub fn new(from: impl Into<String>, to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            text: text.into(),
        }
    }
}

/// Adapter for [`PlainSms`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainAdapter;

impl BackendAdapter for PlainAdapter {
    type Native = PlainSms;

    fn to_canonical<'a>(&self, native: &'a PlainSms) -> Result<SmsMessage<'a>> {
        Ok(SmsMessage::new(
            native.from.as_str(),
            native.to.as_str(),
            native.text.as_str(),
            native,
        ))
    }

    fn from_canonical(&self, original: &PlainSms, message: &SmsMessage<'_>) -> Result<PlainSms> {
        Ok(PlainSms {
            to: message.to.clone(),
            text: message.text.clone(),
            ..original.clone()
        })
    }
}
