//! Backend adapters — mapping between SMS library message types and
//! [`SmsMessage`].

pub mod nexmo;
pub mod plain;

pub use nexmo::NexmoAdapter;
pub use plain::{PlainAdapter, PlainSms};

use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::message::SmsMessage;

/// Two-way mapping for one SMS backend's native message type.
///
/// Both operations default to `Error::NotImplemented`. An adapter that only
/// implements `to_canonical` still works with the email and discard
/// mechanisms; redirecting needs `from_canonical` too.
pub trait BackendAdapter {
    type Native: Debug;

    /// View a native message as a canonical one.
    fn to_canonical<'a>(&self, native: &'a Self::Native) -> Result<SmsMessage<'a>> {
        let _ = native;
        Err(Error::not_implemented::<Self::Native>("to_canonical"))
    }

    /// Build the outgoing native message for a redirected canonical message.
    ///
    /// `original` is the message the application tried to send; fields the
    /// canonical form doesn't carry should be copied from it.
    fn from_canonical(
        &self,
        original: &Self::Native,
        message: &SmsMessage<'_>,
    ) -> Result<Self::Native> {
        let _ = (original, message);
        Err(Error::not_implemented::<Self::Native>("from_canonical"))
    }
}
