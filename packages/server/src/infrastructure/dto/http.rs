//! HTTP API DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use hirewire_shared::event::EventName;

use crate::usecase::BrokerStats;

/// Response of `GET /api/stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDto {
    pub connections: usize,
    pub all_users: usize,
    pub admin_room: usize,
}

impl From<BrokerStats> for StatsDto {
    fn from(stats: BrokerStats) -> Self {
        Self {
            connections: stats.connections,
            all_users: stats.users,
            admin_room: stats.admins,
        }
    }
}

/// Body of `POST /api/notify`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyRequestDto {
    pub event: EventName,
    pub data: Value,
    /// Owner of an `application-status-updated` event
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Response of `POST /api/notify`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyResponseDto {
    pub delivered: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDto {
    pub error: String,
}

impl ErrorDto {
    pub fn new(error: impl ToString) -> Self {
        Self {
            error: error.to_string(),
        }
    }
}
