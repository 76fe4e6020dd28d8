//! In-process group broker.
//!
//! Holds every admitted connection with its outbound channel, and an index
//! from group name to member connections. All fan-out for one publish runs
//! under a single read lock, so frames published in sequence by one caller
//! reach each shared listener in that order.

use std::{
    collections::{BTreeSet, HashMap},
    sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::domain::{BrokerError, Connection, ConnectionId, GroupBroker, GroupName, PusherChannel};

struct Member {
    connection: Connection,
    channel: PusherChannel,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<ConnectionId, Member>,
    groups: HashMap<GroupName, BTreeSet<ConnectionId>>,
}

#[derive(Default)]
pub struct InMemoryGroupBroker {
    registry: RwLock<Registry>,
}

impl InMemoryGroupBroker {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Registry>, BrokerError> {
        self.registry
            .read()
            .map_err(|e| BrokerError::Unavailable(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Registry>, BrokerError> {
        self.registry
            .write()
            .map_err(|e| BrokerError::Unavailable(e.to_string()))
    }
}

impl GroupBroker for InMemoryGroupBroker {
    fn register(&self, connection: Connection, channel: PusherChannel) -> Result<(), BrokerError> {
        let mut registry = self.write()?;
        let connection_id = connection.id().clone();
        if registry.connections.contains_key(&connection_id) {
            return Err(BrokerError::DuplicateConnection(connection_id));
        }

        for group in connection.groups() {
            registry
                .groups
                .entry(group.clone())
                .or_default()
                .insert(connection_id.clone());
        }
        registry
            .connections
            .insert(connection_id, Member { connection, channel });
        Ok(())
    }

    fn unregister(&self, connection_id: &ConnectionId) -> Option<Connection> {
        // Removal must go through even if a writer panicked earlier.
        let mut registry = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let member = registry.connections.remove(connection_id)?;

        for group in member.connection.groups() {
            if let Some(members) = registry.groups.get_mut(group) {
                members.remove(connection_id);
                if members.is_empty() {
                    registry.groups.remove(group);
                }
            }
        }
        Some(member.connection)
    }

    fn publish(&self, group: &GroupName, frame: &str) -> Result<usize, BrokerError> {
        let registry = self.read()?;
        let Some(members) = registry.groups.get(group) else {
            return Ok(0);
        };

        let mut delivered = 0;
        for connection_id in members {
            let Some(member) = registry.connections.get(connection_id) else {
                continue;
            };
            // The receiver is gone while the socket task is tearing down.
            if let Err(e) = member.channel.send(frame.to_string()) {
                tracing::warn!(
                    connection_id = %connection_id,
                    group = %group,
                    "Failed to enqueue frame: {}",
                    e
                );
            } else {
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    fn member_count(&self, group: &GroupName) -> usize {
        self.read()
            .map(|registry| registry.groups.get(group).map_or(0, BTreeSet::len))
            .unwrap_or(0)
    }

    fn connection_count(&self) -> usize {
        self.read()
            .map(|registry| registry.connections.len())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, IdentityId, IdentityKey};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 接続の登録・削除と、グループへの所属の反映
    // - publish がグループのメンバーにだけ届くこと
    //
    // 【どのようなシナリオをテストするか】
    // 1. 登録すると所属グループ全てに反映される
    // 2. 削除すると全グループから抜ける（空のグループは消える）
    // 3. 同じ接続の二重登録はエラー
    // 4. 受信側が閉じた接続は配送数に数えない
    // ========================================

    fn user(id: &str) -> Identity {
        Identity::user(IdentityId::new(id).unwrap())
    }

    #[test]
    fn test_register_joins_every_group_of_the_connection() {
        // テスト項目: 登録すると接続の所属グループ全てにメンバーとして追加される
        // given (前提条件):
        let broker = InMemoryGroupBroker::new();
        let connection = Connection::open(user("u1"), 0);
        let private = GroupName::private_for(&IdentityKey::user(IdentityId::new("u1").unwrap()));
        let (tx, _rx) = mpsc::unbounded_channel();

        // when (操作):
        broker.register(connection, tx).unwrap();

        // then (期待する結果):
        assert_eq!(broker.connection_count(), 1);
        assert_eq!(broker.member_count(&private), 1);
        assert_eq!(broker.member_count(&GroupName::AllUsers), 1);
        assert_eq!(broker.member_count(&GroupName::AllAdmins), 0);
    }

    #[test]
    fn test_register_same_connection_twice_fails() {
        // テスト項目: 同じ接続 ID の二重登録はエラーになる
        // given (前提条件):
        let broker = InMemoryGroupBroker::new();
        let connection = Connection::open(user("u1"), 0);
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        broker.register(connection.clone(), tx1).unwrap();

        // when (操作):
        let result = broker.register(connection.clone(), tx2);

        // then (期待する結果):
        assert_eq!(
            result,
            Err(BrokerError::DuplicateConnection(connection.id().clone()))
        );
        assert_eq!(broker.member_count(&GroupName::AllUsers), 1);
    }

    #[test]
    fn test_unregister_leaves_every_group() {
        // テスト項目: 削除すると全グループから抜け、他の接続は残る
        // given (前提条件):
        let broker = InMemoryGroupBroker::new();
        let tab1 = Connection::open(user("u1"), 0);
        let tab2 = Connection::open(user("u1"), 0);
        let private = GroupName::private_for(tab1.identity().key());
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        broker.register(tab1.clone(), tx1).unwrap();
        broker.register(tab2.clone(), tx2).unwrap();

        // when (操作):
        let removed = broker.unregister(tab1.id());

        // then (期待する結果):
        assert_eq!(removed, Some(tab1.clone()));
        assert_eq!(broker.member_count(&private), 1);
        assert_eq!(broker.member_count(&GroupName::AllUsers), 1);

        // 最後の接続が抜けるとグループ自体が消える
        broker.unregister(tab2.id());
        assert_eq!(broker.member_count(&private), 0);
        assert_eq!(broker.publish(&private, "{}"), Ok(0));
        assert_eq!(broker.unregister(tab2.id()), None);
    }

    #[test]
    fn test_publish_reaches_only_group_members() {
        // テスト項目: publish はグループのメンバーにだけフレームを届ける
        // given (前提条件):
        let broker = InMemoryGroupBroker::new();
        let (user_tx, mut user_rx) = mpsc::unbounded_channel();
        let (admin_tx, mut admin_rx) = mpsc::unbounded_channel();
        broker
            .register(Connection::open(user("u1"), 0), user_tx)
            .unwrap();
        broker
            .register(
                Connection::open(Identity::admin(IdentityId::new("a1").unwrap(), false), 0),
                admin_tx,
            )
            .unwrap();

        // when (操作):
        let delivered = broker.publish(&GroupName::AllAdmins, r#"{"hello":"admins"}"#);

        // then (期待する結果):
        assert_eq!(delivered, Ok(1));
        assert_eq!(admin_rx.try_recv().unwrap(), r#"{"hello":"admins"}"#);
        assert!(user_rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_skips_closed_receivers() {
        // テスト項目: 受信側が閉じた接続は配送数に含めず、エラーにもしない
        // given (前提条件):
        let broker = InMemoryGroupBroker::new();
        let (open_tx, mut open_rx) = mpsc::unbounded_channel();
        let (closed_tx, closed_rx) = mpsc::unbounded_channel::<String>();
        broker
            .register(Connection::open(user("u1"), 0), open_tx)
            .unwrap();
        broker
            .register(Connection::open(user("u2"), 0), closed_tx)
            .unwrap();
        drop(closed_rx);

        // when (操作):
        let delivered = broker.publish(&GroupName::AllUsers, "frame");

        // then (期待する結果):
        assert_eq!(delivered, Ok(1));
        assert_eq!(open_rx.try_recv().unwrap(), "frame");
    }
}
