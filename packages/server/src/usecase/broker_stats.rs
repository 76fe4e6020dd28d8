//! UseCase: ブローカーの接続状況を取得（デバッグ・監視用）

use std::sync::Arc;

use crate::domain::{GroupBroker, GroupName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokerStats {
    pub connections: usize,
    pub users: usize,
    pub admins: usize,
}

pub struct GetBrokerStatsUseCase {
    broker: Arc<dyn GroupBroker>,
}

impl GetBrokerStatsUseCase {
    pub fn new(broker: Arc<dyn GroupBroker>) -> Self {
        Self { broker }
    }

    pub fn execute(&self) -> BrokerStats {
        BrokerStats {
            connections: self.broker.connection_count(),
            users: self.broker.member_count(&GroupName::AllUsers),
            admins: self.broker.member_count(&GroupName::AllAdmins),
        }
    }
}
