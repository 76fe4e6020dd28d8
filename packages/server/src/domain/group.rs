//! Multicast groups (rooms) and the routing rule that assigns them.
//!
//! `groups_for` is the only place group names are derived from an identity.
//! The connection gate uses it on admission and the emitter resolves its
//! targets through the same constructors, so the two cannot drift apart.

use std::{collections::BTreeSet, fmt};

use super::identity::{Identity, IdentityKey, IdentityKind};

pub const ALL_USERS_GROUP: &str = "all-users";
pub const ALL_ADMINS_GROUP: &str = "admin-room";

/// A named multicast target
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupName {
    /// Every connection of one identity (e.g. several browser tabs)
    Private(IdentityKey),
    AllUsers,
    AllAdmins,
}

impl GroupName {
    pub fn private_for(key: &IdentityKey) -> Self {
        GroupName::Private(key.clone())
    }

    /// The shared group every identity of `kind` joins
    pub fn shared_for(kind: IdentityKind) -> Self {
        match kind {
            IdentityKind::User => GroupName::AllUsers,
            IdentityKind::Admin => GroupName::AllAdmins,
        }
    }

    pub fn is_shared(&self) -> bool {
        !matches!(self, GroupName::Private(_))
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupName::Private(key) => write!(f, "identity:{}:{}", key.kind, key.id),
            GroupName::AllUsers => f.write_str(ALL_USERS_GROUP),
            GroupName::AllAdmins => f.write_str(ALL_ADMINS_GROUP),
        }
    }
}

/// Groups a connection with this identity joins: its private group plus
/// exactly one shared group chosen by identity kind.
pub fn groups_for(identity: &Identity) -> BTreeSet<GroupName> {
    BTreeSet::from([
        GroupName::private_for(identity.key()),
        GroupName::shared_for(identity.kind()),
    ])
}
