//! SmsSafe — keeps outbound SMS away from real phone numbers outside production.
//!
//! Every message the application sends is run through an [`Interceptor`].
//! Messages to internal numbers go out untouched; the rest are redirected to
//! a safe number, emailed, or discarded.

pub mod backends;
pub mod config;
pub mod error;
pub mod interceptor;
pub mod mail;
pub mod mechanism;
pub mod message;
pub mod rules;

pub use backends::{BackendAdapter, NexmoAdapter, PlainAdapter, PlainSms};
pub use config::{InterceptConfig, InterceptMechanism, Target};
pub use error::{ConfigError, DeliveryError, Error, Result};
pub use interceptor::Interceptor;
pub use mail::{EnvMailer, InterceptEmail, Mailer, TransportMailer};
pub use mechanism::Handled;
pub use message::SmsMessage;
pub use rules::Rule;
