//! Intercept mechanisms — what happens to a message once it is intercepted.

use std::thread;

use tracing::{debug, info};

use crate::config::{InterceptConfig, InterceptMechanism, Target};
use crate::error::{Error, Result};
use crate::mail::{InterceptEmail, Mailer};
use crate::message::SmsMessage;

/// Outcome of handling an intercepted message.
#[derive(Debug)]
pub enum Handled<'a> {
    /// Send this message instead of the original.
    Redirected(SmsMessage<'a>),
    /// Don't send anything.
    Suppressed,
}

/// Apply the configured mechanism to an intercepted message.
pub fn handle<'a>(
    message: SmsMessage<'a>,
    config: &InterceptConfig,
    mailer: &dyn Mailer,
) -> Result<Handled<'a>> {
    let mechanism = config.mechanism()?;
    info!(
        to = %message.to,
        mechanism = %mechanism,
        "Intercepting SMS"
    );

    match mechanism {
        InterceptMechanism::Redirect => redirect(&message, config).map(Handled::Redirected),
        InterceptMechanism::Email => {
            email(&message, config, mailer)?;
            Ok(Handled::Suppressed)
        }
        InterceptMechanism::Discard => {
            discard(config);
            Ok(Handled::Suppressed)
        }
    }
}

/// Readdress the message to the redirect target, annotating its text.
pub fn redirect<'a>(
    message: &SmsMessage<'a>,
    config: &InterceptConfig,
) -> Result<SmsMessage<'a>> {
    let target = resolve_target(
        "redirect_target",
        config.redirect_target.as_ref(),
        message,
    )?;
    debug!(from = %message.to, to = %target, "Redirecting SMS");
    Ok(message.redirected(target))
}

/// Email the message to the email target. Delivery errors propagate.
pub fn email(
    message: &SmsMessage<'_>,
    config: &InterceptConfig,
    mailer: &dyn Mailer,
) -> Result<()> {
    let recipient = resolve_target("email_target", config.email_target.as_ref(), message)?;
    let email = mailer.wrap_delivery(InterceptEmail::for_message(message, &recipient));
    mailer.deliver(&email)?;
    Ok(())
}

/// Drop the message, after the configured delay if any.
///
/// The delay emulates the latency of a real provider call and blocks the
/// calling thread.
pub fn discard(config: &InterceptConfig) {
    if let Some(delay) = config.discard_delay.filter(|d| !d.is_zero()) {
        debug!(delay = ?delay, "Delaying discarded SMS");
        thread::sleep(delay);
    }
}

fn resolve_target(
    setting: &'static str,
    target: Option<&Target>,
    message: &SmsMessage<'_>,
) -> Result<String> {
    const EXPECTED: &str = "a string or a function of the message";
    match target {
        Some(Target::Literal(value)) => Ok(value.clone()),
        Some(Target::Derived(f)) => Ok(f(message)),
        Some(Target::Unsupported(raw)) => Err(Error::invalid(setting, EXPECTED, raw.clone())),
        None => Err(Error::invalid(setting, EXPECTED, "(not set)")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use crate::error::DeliveryError;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<InterceptEmail>>,
    }

    impl Mailer for RecordingMailer {
        fn deliver(&self, email: &InterceptEmail) -> std::result::Result<(), DeliveryError> {
            self.sent.lock().unwrap().push(email.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    impl Mailer for FailingMailer {
        fn deliver(&self, _email: &InterceptEmail) -> std::result::Result<(), DeliveryError> {
            Err(DeliveryError::Transport("connection refused".into()))
        }
    }

    struct TaggingMailer {
        inner: RecordingMailer,
    }

    impl Mailer for TaggingMailer {
        fn wrap_delivery(&self, mut email: InterceptEmail) -> InterceptEmail {
            email.subject = format!("[staging] {}", email.subject);
            email
        }

        fn deliver(&self, email: &InterceptEmail) -> std::result::Result<(), DeliveryError> {
            self.inner.deliver(email)
        }
    }

    #[test]
    fn redirect_to_literal_target() {
        let native = ();
        let msg = SmsMessage::new("A", "B", "hi", &native);
        let config = InterceptConfig::new().with_redirect_target("C");
        let out = redirect(&msg, &config).unwrap();
        assert_eq!(out.to, "C");
        assert_eq!(out.text, "hi (SmsSafe: B)");
    }

    #[test]
    fn redirect_to_derived_target() {
        let native = ();
        let msg = SmsMessage::new("+15550001", "+447111", "hi", &native);
        let config = InterceptConfig::new()
            .with_redirect_target(Target::derived(|m| format!("{}-dev", m.from)));
        assert_eq!(redirect(&msg, &config).unwrap().to, "+15550001-dev");
    }

    #[test]
    fn redirect_without_target_is_invalid() {
        let native = ();
        let msg = SmsMessage::new("A", "B", "hi", &native);
        let err = redirect(&msg, &InterceptConfig::new()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration { setting: "redirect_target", .. }
        ));
    }

    #[test]
    fn unsupported_email_target_is_invalid() {
        let native = ();
        let msg = SmsMessage::new("A", "B", "hi", &native);
        let mut config = InterceptConfig::new();
        config.email_target = Some(Target::Unsupported("42".into()));
        let err = email(&msg, &config, &RecordingMailer::default()).unwrap_err();
        match err {
            Error::InvalidConfiguration { setting, value, .. } => {
                assert_eq!(setting, "email_target");
                assert_eq!(value, "42");
            }
            other => panic!("Expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn email_sends_one_message_and_suppresses() {
        let native = ();
        let msg = SmsMessage::new("A", "B", "hi", &native);
        let config = InterceptConfig::new()
            .with_mechanism(InterceptMechanism::Email)
            .with_email_target("dev@example.com");
        let mailer = RecordingMailer::default();
        let handled = handle(msg, &config, &mailer).unwrap();
        assert!(matches!(handled, Handled::Suppressed));
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "dev@example.com");
        assert_eq!(sent[0].subject, "SmsSafe: B - hi");
    }

    #[test]
    fn email_target_can_be_derived() {
        let native = ();
        let msg = SmsMessage::new("A", "B", "hi", &native);
        let config = InterceptConfig::new()
            .with_email_target(Target::derived(|m| format!("sms-{}@example.com", m.to)));
        let mailer = RecordingMailer::default();
        email(&msg, &config, &mailer).unwrap();
        assert_eq!(mailer.sent.lock().unwrap()[0].to, "sms-B@example.com");
    }

    #[test]
    fn wrap_delivery_runs_before_deliver() {
        let native = ();
        let msg = SmsMessage::new("A", "B", "hi", &native);
        let config = InterceptConfig::new().with_email_target("dev@example.com");
        let mailer = TaggingMailer {
            inner: RecordingMailer::default(),
        };
        email(&msg, &config, &mailer).unwrap();
        assert_eq!(
            mailer.inner.sent.lock().unwrap()[0].subject,
            "[staging] SmsSafe: B - hi"
        );
    }

    #[test]
    fn delivery_failure_propagates() {
        let native = ();
        let msg = SmsMessage::new("A", "B", "hi", &native);
        let config = InterceptConfig::new().with_email_target("dev@example.com");
        let err = email(&msg, &config, &FailingMailer).unwrap_err();
        assert!(matches!(err, Error::Delivery(DeliveryError::Transport(_))));
    }

    #[test]
    fn discard_honours_delay() {
        let config = InterceptConfig::new().with_discard_delay(Duration::from_millis(50));
        let start = Instant::now();
        discard(&config);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn discard_without_delay_returns_quickly() {
        let start = Instant::now();
        discard(&InterceptConfig::new());
        discard(&InterceptConfig::new().with_discard_delay(Duration::ZERO));
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn unknown_mechanism_is_invalid() {
        let native = ();
        let msg = SmsMessage::new("A", "B", "hi", &native);
        let config = InterceptConfig::new().with_mechanism_name("bogus");
        let err = handle(msg, &config, &RecordingMailer::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidConfiguration { setting: "intercept_mechanism", .. }
        ));
    }
}
