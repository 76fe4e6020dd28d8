//! Live transport session as the broker sees it.

use std::{collections::BTreeSet, fmt};

use uuid::Uuid;

use super::{
    group::{GroupName, groups_for},
    identity::Identity,
};

/// Opaque connection identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An admitted connection.
///
/// Group memberships are fixed when the connection is opened. There is no
/// API to change them afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    id: ConnectionId,
    identity: Identity,
    groups: BTreeSet<GroupName>,
    connected_at: i64,
}

impl Connection {
    /// Open a connection for an authenticated identity.
    pub fn open(identity: Identity, connected_at: i64) -> Self {
        let groups = groups_for(&identity);
        Self {
            id: ConnectionId::generate(),
            identity,
            groups,
            connected_at,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn groups(&self) -> &BTreeSet<GroupName> {
        &self.groups
    }

    /// Unix timestamp in milliseconds
    pub fn connected_at(&self) -> i64 {
        self.connected_at
    }
}
