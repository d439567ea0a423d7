//! Push delivery adapters.
//!
//! A [`PushSender`] turns one device token plus a flat data payload into a
//! single delivery attempt. Senders never retry and never deregister tokens;
//! they only classify the failure so the caller can decide.

pub mod dry_run;
pub mod fcm;

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

pub use dry_run::DryRunSender;
pub use fcm::FcmSender;

/// Data-only push payload. Every value is a string.
pub type PushData = BTreeMap<String, String>;

/// Classified delivery failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// The provider reports the destination token is no longer registered.
    #[error("push token is no longer registered")]
    Unregistered,

    /// Any other transport or provider error.
    #[error("push provider error: {0}")]
    Provider(String),
}

/// A push-delivery provider.
#[async_trait]
pub trait PushSender: Send + Sync {
    /// Deliver `data` to `token`, returning the provider-assigned message id.
    async fn send(&self, token: &str, data: &PushData) -> Result<String, PushError>;
}
