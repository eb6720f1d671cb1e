//! Notification email for intercepted messages, and the mail delivery seam.
//!
//! The email mechanism builds an [`InterceptEmail`] and hands it to a
//! [`Mailer`]. [`TransportMailer`] adapts any `lettre` transport;
//! [`detect_mailer`] picks one from the environment, and [`EnvMailer`]
//! defers that pick until an email is actually sent.

use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use crate::error::DeliveryError;
use crate::message::SmsMessage;

// ── Email ───────────────────────────────────────────────────────────

/// A structured notification email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterceptEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl InterceptEmail {
    /// Build the notification for `message`, sent from and to `recipient`.
    pub fn for_message(message: &SmsMessage<'_>, recipient: &str) -> Self {
        Self {
            from: recipient.to_string(),
            to: recipient.to_string(),
            subject: format!("SmsSafe: {} - {}", message.to, message.text),
            body: email_body(message),
        }
    }

    /// Convert into a `lettre` message ready for a transport.
    pub fn to_lettre(&self) -> Result<Message, DeliveryError> {
        Message::builder()
            .from(parse_mailbox(&self.from)?)
            .to(parse_mailbox(&self.to)?)
            .subject(self.subject.clone())
            .body(self.body.clone())
            .map_err(|e| DeliveryError::Build(e.to_string()))
    }
}

/// Body of the notification email.
pub fn email_body(message: &SmsMessage<'_>) -> String {
    format!(
        "This email was originally an SMS that SmsSafe intercepted:\n\
         \n\
         From: {}\n\
         To: {}\n\
         Text: {}\n\
         \n\
         Full object: {:?}\n",
        message.from, message.to, message.text, message.original
    )
}

fn parse_mailbox(address: &str) -> Result<Mailbox, DeliveryError> {
    address
        .parse()
        .map_err(|e: lettre::address::AddressError| DeliveryError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

// ── Mailer ──────────────────────────────────────────────────────────

/// Delivers notification emails.
pub trait Mailer: Send + Sync {
    /// Hook for a host mail framework to adjust the email before delivery.
    fn wrap_delivery(&self, email: InterceptEmail) -> InterceptEmail {
        email
    }

    /// Deliver the email. Blocks until the transport returns.
    fn deliver(&self, email: &InterceptEmail) -> Result<(), DeliveryError>;
}

/// [`Mailer`] backed by any synchronous `lettre` transport.
pub struct TransportMailer<T> {
    transport: T,
}

impl<T> TransportMailer<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T> Mailer for TransportMailer<T>
where
    T: Transport + Send + Sync,
    T::Error: std::fmt::Display,
{
    fn deliver(&self, email: &InterceptEmail) -> Result<(), DeliveryError> {
        let message = email.to_lettre()?;
        self.transport
            .send(&message)
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        info!(to = %email.to, "Intercepted SMS emailed");
        Ok(())
    }
}

// ── SMTP ────────────────────────────────────────────────────────────

/// SMTP relay settings, built from environment variables.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
}

impl SmtpConfig {
    /// Build config from environment variables.
    /// Returns `None` if `SMS_SAFE_SMTP_HOST` is not set.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("SMS_SAFE_SMTP_HOST")?;

        let port: u16 = lookup("SMS_SAFE_SMTP_PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(587);

        let username = lookup("SMS_SAFE_SMTP_USERNAME").unwrap_or_default();
        let password = SecretString::from(lookup("SMS_SAFE_SMTP_PASSWORD").unwrap_or_default());

        Some(Self {
            host,
            port,
            username,
            password,
        })
    }

    /// Build an authenticated TLS relay transport.
    pub fn transport(&self) -> Result<SmtpTransport, DeliveryError> {
        let creds = Credentials::new(
            self.username.clone(),
            self.password.expose_secret().to_string(),
        );

        Ok(SmtpTransport::relay(&self.host)
            .map_err(|e| DeliveryError::Transport(format!("SMTP relay error: {e}")))?
            .port(self.port)
            .credentials(creds)
            .build())
    }
}

/// Pick a mailer from the environment.
///
/// Uses the SMTP relay from [`SmtpConfig::from_env`] when configured,
/// otherwise an unencrypted SMTP transport to localhost.
pub fn detect_mailer() -> Result<Box<dyn Mailer>, DeliveryError> {
    match SmtpConfig::from_env() {
        Some(config) => {
            info!(
                host = %config.host,
                port = config.port,
                "Delivering SmsSafe emails via SMTP relay"
            );
            Ok(Box::new(TransportMailer::new(config.transport()?)))
        }
        None => Ok(Box::new(TransportMailer::new(
            SmtpTransport::unencrypted_localhost(),
        ))),
    }
}

/// Mailer that picks its transport with [`detect_mailer`] on each delivery.
///
/// Nothing is read from the environment until an email actually has to go
/// out, so configurations that never email need no mail setup.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvMailer;

impl Mailer for EnvMailer {
    fn deliver(&self, email: &InterceptEmail) -> Result<(), DeliveryError> {
        detect_mailer()?.deliver(email)
    }
}
