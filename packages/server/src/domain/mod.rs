//! Domain layer of the notification gateway.
//!
//! Pure types and the traits the use cases depend on. Concrete broker and
//! token implementations live in `infrastructure` (dependency inversion).

pub mod audience;
pub mod broker;
pub mod connection;
pub mod group;
pub mod identity;
pub mod verifier;

pub use audience::Audience;
pub use broker::{BrokerError, GroupBroker, PusherChannel};
pub use connection::{Connection, ConnectionId};
pub use group::{GroupName, groups_for};
pub use identity::{Identity, IdentityError, IdentityId, IdentityKey, IdentityKind};
pub use verifier::{AuthError, TokenVerifier};
