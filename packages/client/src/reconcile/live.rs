//! Ties a subscriber's event stream to the reconciler.

use std::sync::Arc;

use tokio::sync::broadcast::{self, error::RecvError};

use crate::{
    domain::{ConnectionState, Role},
    subscriber::SubscriberEvent,
};

use super::{
    reconciler::{ReconcileAction, Reconciler},
    source::SnapshotSource,
    toast::Toast,
};

/// Page state for one logged-in role, kept live by pushed events.
///
/// Every (re)connect triggers a full refetch, since events sent while the
/// client was offline are lost. A failed refetch keeps the last snapshot.
pub struct LiveView {
    role: Role,
    source: Arc<dyn SnapshotSource>,
    reconciler: Reconciler,
}

impl LiveView {
    pub fn new(role: Role, source: Arc<dyn SnapshotSource>) -> Self {
        Self {
            role,
            source,
            reconciler: Reconciler::new(),
        }
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Refetch everything this role's page shows.
    pub async fn refresh(&mut self) {
        match self.source.fetch_jobs().await {
            Ok(jobs) => self.reconciler.jobs_mut().apply_snapshot(jobs),
            Err(e) => tracing::warn!("Failed to refetch jobs: {}", e),
        }

        match self.role {
            Role::User => match self.source.fetch_applied_jobs().await {
                Ok(records) => self.reconciler.applied_mut().apply_snapshot(records),
                Err(e) => tracing::warn!("Failed to refetch applied jobs: {}", e),
            },
            Role::Admin => self.refresh_stats().await,
        }
    }

    async fn refresh_stats(&mut self) {
        match self.source.fetch_admin_stats().await {
            Ok(stats) => self.reconciler.dashboard_mut().apply_snapshot(stats),
            Err(e) => tracing::warn!("Failed to refetch admin stats: {}", e),
        }
    }

    /// Apply one subscriber event. Returns the toast to show, if any.
    pub async fn handle(&mut self, event: &SubscriberEvent) -> Option<Toast> {
        match event {
            SubscriberEvent::Received(notification) => {
                let reconciled = self
                    .reconciler
                    .apply(notification.event_id, &notification.event)?;
                if reconciled.action == ReconcileAction::RefetchStats {
                    self.refresh_stats().await;
                }
                Some(reconciled.toast)
            }
            SubscriberEvent::StateChanged(ConnectionState::Connected) => {
                self.refresh().await;
                None
            }
            SubscriberEvent::StateChanged(_) | SubscriberEvent::SessionEnded(_) => None,
        }
    }

    /// Consume events until the subscriber is dropped.
    pub async fn run(
        mut self,
        mut events: broadcast::Receiver<SubscriberEvent>,
        mut on_toast: impl FnMut(Toast) + Send,
    ) -> Self {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Some(toast) = self.handle(&event).await {
                        on_toast(toast);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} subscriber events, refetching", skipped);
                    self.refresh().await;
                }
                Err(RecvError::Closed) => break,
            }
        }
        self
    }
}
