//! Use case errors.

use hirewire_shared::event::EventName;
use thiserror::Error;

use crate::domain::{AuthError, BrokerError};

/// Connection admission failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdmitError {
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    #[error("failed to register connection: {0}")]
    Registration(#[from] BrokerError),
}

/// Fan-out failure inside the emitter. Logged, never returned to callers.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to serialize notification: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("broker rejected notification: {0}")]
    Broker(#[from] BrokerError),
}

/// The event cannot be routed with the information given
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("'{0}' is addressed to one user but no user id was given")]
    MissingRecipient(EventName),
}
