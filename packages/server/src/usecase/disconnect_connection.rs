//! UseCase: 接続の切断
//!
//! 切断された接続をブローカーから取り除く。所属グループは接続と一緒に
//! 破棄されるので、個別の leave 操作は無い。何度呼んでも安全（冪等）。

use std::sync::Arc;

use crate::domain::{Connection, ConnectionId, GroupBroker};

/// 接続切断のユースケース
pub struct DisconnectConnectionUseCase {
    broker: Arc<dyn GroupBroker>,
}

impl DisconnectConnectionUseCase {
    pub fn new(broker: Arc<dyn GroupBroker>) -> Self {
        Self { broker }
    }

    /// Returns the removed connection, `None` when it was already gone.
    pub fn execute(&self, connection_id: &ConnectionId) -> Option<Connection> {
        let removed = self.broker.unregister(connection_id);
        match &removed {
            Some(connection) => tracing::debug!(
                connection_id = %connection_id,
                identity = %connection.identity().key(),
                "Connection removed from broker"
            ),
            None => tracing::debug!(
                connection_id = %connection_id,
                "Connection was already removed"
            ),
        }
        removed
    }
}
