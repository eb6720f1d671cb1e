//! Interception engine.
//!
//! Flow for every outbound message:
//! 1. `BackendAdapter::to_canonical()` — native message → [`SmsMessage`]
//! 2. [`should_intercept`] — internal recipients pass through untouched
//! 3. [`mechanism::handle`] — redirect, email or discard
//! 4. `BackendAdapter::from_canonical()` — only when redirecting

use std::fmt;

use tracing::debug;

use crate::backends::BackendAdapter;
use crate::config::InterceptConfig;
use crate::error::Result;
use crate::mail::{EnvMailer, Mailer};
use crate::mechanism::{self, Handled};
use crate::message::SmsMessage;
use crate::rules::should_intercept;

/// Decides what happens to each outbound SMS.
///
/// Holds an immutable configuration, so one interceptor can be shared
/// across threads.
pub struct Interceptor {
    config: InterceptConfig,
    mailer: Box<dyn Mailer>,
}

impl Interceptor {
    /// Create an interceptor that emails through [`EnvMailer`].
    ///
    /// The mail transport is only resolved when the email mechanism runs.
    pub fn new(config: InterceptConfig) -> Self {
        Self::with_mailer(config, Box::new(EnvMailer))
    }

    pub fn with_mailer(config: InterceptConfig, mailer: Box<dyn Mailer>) -> Self {
        Self { config, mailer }
    }

    pub fn config(&self) -> &InterceptConfig {
        &self.config
    }

    /// Process one outbound message.
    ///
    /// Returns the message to send (the very same value when not intercepted,
    /// a rebuilt one when redirected) or `None` if sending must be suppressed.
    pub fn process<A>(&self, adapter: &A, native: A::Native) -> Result<Option<A::Native>>
    where
        A: BackendAdapter,
    {
        // `None` is pass-through. The canonical view borrows `native`.
        let intercepted = {
            let message = adapter.to_canonical(&native)?;
            if self.should_intercept(&message)? {
                Some(match self.intercept(message)? {
                    Handled::Redirected(redirected) => {
                        Some(adapter.from_canonical(&native, &redirected)?)
                    }
                    Handled::Suppressed => None,
                })
            } else {
                debug!(to = %message.to, "Recipient is internal, sending as is");
                None
            }
        };

        match intercepted {
            Some(outgoing) => Ok(outgoing),
            None => Ok(Some(native)),
        }
    }

    /// Whether `message` would be intercepted under this configuration.
    pub fn should_intercept(&self, message: &SmsMessage<'_>) -> Result<bool> {
        should_intercept(message, &self.config.internal_phone_numbers)
    }

    /// Apply the configured mechanism to a message already known to need it.
    pub fn intercept<'a>(&self, message: SmsMessage<'a>) -> Result<Handled<'a>> {
        mechanism::handle(message, &self.config, self.mailer.as_ref())
    }
}

impl fmt::Debug for Interceptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
