//! Nexmo-style send parameters: a JSON object with `from`, `to`, `text` and
//! any number of provider options (`type`, `status-report-req`, ...).

use serde_json::{Map, Value};

use crate::backends::BackendAdapter;
use crate::error::Result;
use crate::message::SmsMessage;

/// Adapter for Nexmo send parameter objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct NexmoAdapter;

/// Read a parameter as text. Missing or null parameters read as empty.
fn param(params: &Map<String, Value>, key: &str) -> String {
    match params.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl BackendAdapter for NexmoAdapter {
    type Native = Map<String, Value>;

    fn to_canonical<'a>(&self, native: &'a Map<String, Value>) -> Result<SmsMessage<'a>> {
        Ok(SmsMessage::new(
            param(native, "from"),
            param(native, "to"),
            param(native, "text"),
            native,
        ))
    }

    fn from_canonical(
        &self,
        original: &Map<String, Value>,
        message: &SmsMessage<'_>,
    ) -> Result<Map<String, Value>> {
        let mut params = original.clone();
        params.insert("to".into(), Value::String(message.to.clone()));
        params.insert("text".into(), Value::String(message.text.clone()));
        Ok(params)
    }
}
