//! Shared application state.

use std::{sync::Arc, time::Duration};

use hirewire_shared::time::Clock;

use crate::{
    domain::{GroupBroker, TokenVerifier},
    usecase::{
        AdmitConnectionUseCase, DisconnectConnectionUseCase, GetBrokerStatsUseCase,
        NotificationEmitter,
    },
};

pub struct AppState {
    /// AdmitConnectionUseCase（接続受け入れのユースケース）
    pub admit_connection_usecase: Arc<AdmitConnectionUseCase>,
    /// DisconnectConnectionUseCase（接続切断のユースケース）
    pub disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
    /// GetBrokerStatsUseCase（接続数取得のユースケース）
    pub get_broker_stats_usecase: Arc<GetBrokerStatsUseCase>,
    /// NotificationEmitter（イベント送信の唯一の経路）
    pub emitter: NotificationEmitter,
    /// `/api/notify` の呼び出し元を検証する
    pub verifier: Arc<dyn TokenVerifier>,
    pub heartbeat_interval: Duration,
    pub idle_timeout: Duration,
}

impl AppState {
    /// Wire every use case to the same broker.
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        broker: Arc<dyn GroupBroker>,
        clock: Arc<dyn Clock>,
        heartbeat_interval: Duration,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            admit_connection_usecase: Arc::new(AdmitConnectionUseCase::new(
                verifier.clone(),
                broker.clone(),
                clock.clone(),
            )),
            disconnect_connection_usecase: Arc::new(DisconnectConnectionUseCase::new(
                broker.clone(),
            )),
            get_broker_stats_usecase: Arc::new(GetBrokerStatsUseCase::new(broker.clone())),
            emitter: NotificationEmitter::new(broker, clock),
            verifier,
            heartbeat_interval,
            idle_timeout,
        }
    }
}
