//! Applies pushed events to the in-memory lists.

use std::collections::{HashSet, VecDeque};

use uuid::Uuid;

use hirewire_shared::event::NotificationEvent;

use super::{
    board::{AdminDashboard, AppliedJobs, JobBoard},
    toast::Toast,
};

/// How many recent event ids are remembered for replay detection
pub const DEDUP_WINDOW: usize = 256;

/// What applying an event did to local state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Nothing local changed (already listed, or the job is gone)
    Unchanged,
    JobsChanged,
    AppliedJobsChanged,
    /// Counts are server-side only: the caller should refetch them
    RefetchStats,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub toast: Toast,
    pub action: ReconcileAction,
}

#[derive(Debug, Default)]
pub struct Reconciler {
    jobs: JobBoard,
    applied: AppliedJobs,
    dashboard: AdminDashboard,
    seen: HashSet<Uuid>,
    seen_order: VecDeque<Uuid>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn jobs(&self) -> &JobBoard {
        &self.jobs
    }

    pub fn applied(&self) -> &AppliedJobs {
        &self.applied
    }

    pub fn dashboard(&self) -> &AdminDashboard {
        &self.dashboard
    }

    pub fn jobs_mut(&mut self) -> &mut JobBoard {
        &mut self.jobs
    }

    pub fn applied_mut(&mut self) -> &mut AppliedJobs {
        &mut self.applied
    }

    pub fn dashboard_mut(&mut self) -> &mut AdminDashboard {
        &mut self.dashboard
    }

    /// Apply one pushed event.
    ///
    /// Returns `None` for a replay of an event id already applied. Frames
    /// without an id are always applied.
    pub fn apply(
        &mut self,
        event_id: Option<Uuid>,
        event: &NotificationEvent,
    ) -> Option<Reconciled> {
        if let Some(id) = event_id
            && !self.remember(id)
        {
            tracing::debug!(event_id = %id, event = %event.name(), "Skipping replayed event");
            return None;
        }

        let action = match event {
            NotificationEvent::NewJobPosted(job) => {
                if self.jobs.insert_posted(job.clone()) {
                    ReconcileAction::JobsChanged
                } else {
                    ReconcileAction::Unchanged
                }
            }
            NotificationEvent::JobDeleted(deleted) => {
                if self.jobs.remove(&deleted.job_id) {
                    ReconcileAction::JobsChanged
                } else {
                    ReconcileAction::Unchanged
                }
            }
            NotificationEvent::ApplicationStatusUpdated(update) => {
                if self.applied.apply_status(update) {
                    ReconcileAction::AppliedJobsChanged
                } else {
                    tracing::debug!(
                        job_id = %update.job_id,
                        "Status update for unlisted job ignored"
                    );
                    ReconcileAction::Unchanged
                }
            }
            NotificationEvent::NewApplication(_) => ReconcileAction::RefetchStats,
        };

        Some(Reconciled {
            toast: Toast::for_event(event),
            action,
        })
    }

    /// Returns `false` if the id was already in the window.
    fn remember(&mut self, id: Uuid) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.seen_order.push_back(id);
        if self.seen_order.len() > DEDUP_WINDOW
            && let Some(oldest) = self.seen_order.pop_front()
        {
            self.seen.remove(&oldest);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::board::AppliedJob;
    use hirewire_shared::event::{ApplicationStatusUpdate, JobDeleted, JobRecord, NewApplication};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 4 種類のイベントごとのローカル状態の更新
    // - イベント ID による重複排除とウィンドウの上限
    //
    // 【どのようなシナリオをテストするか】
    // 1. 求人の追加・削除
    // 2. 一覧に無い求人へのステータス更新は無視（再挿入しない）
    // 3. 応募通知は件数を変えず再取得を指示する
    // 4. 同じイベント ID は 2 回適用しない。ID 無しは常に適用する
    // ========================================

    fn status_update(job_id: &str, status: &str) -> NotificationEvent {
        NotificationEvent::ApplicationStatusUpdated(ApplicationStatusUpdate {
            job_id: job_id.to_string(),
            status: status.to_string(),
            job_title: "Backend".to_string(),
            company_name: "Acme".to_string(),
        })
    }

    #[test]
    fn test_job_posted_and_deleted_patch_the_list() {
        // テスト項目: 求人投稿は先頭に追加、削除は ID で取り除く
        // given (前提条件):
        let mut reconciler = Reconciler::new();
        reconciler
            .jobs_mut()
            .apply_snapshot(vec![JobRecord::new("j1", "Backend", "Acme")]);

        // when (操作):
        let posted = reconciler
            .apply(None, &NotificationEvent::NewJobPosted(JobRecord::new("j2", "SRE", "Acme")))
            .unwrap();
        let deleted = reconciler
            .apply(
                None,
                &NotificationEvent::JobDeleted(JobDeleted {
                    job_id: "j1".to_string(),
                }),
            )
            .unwrap();

        // then (期待する結果):
        assert_eq!(posted.action, ReconcileAction::JobsChanged);
        assert_eq!(deleted.action, ReconcileAction::JobsChanged);
        let ids: Vec<&str> = reconciler.jobs().jobs().iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["j2"]);
    }

    #[test]
    fn test_stale_status_update_is_ignored() {
        // テスト項目: 一覧から消えた求人へのステータス更新は再挿入されず、エラーにもならない
        // given (前提条件):
        let mut reconciler = Reconciler::new();
        reconciler
            .applied_mut()
            .apply_snapshot(vec![AppliedJob::new("j1", "Backend", "Acme", "Applied")]);

        // when (操作):
        let stale = reconciler.apply(None, &status_update("j-gone", "Shortlisted")).unwrap();
        let live = reconciler.apply(None, &status_update("j1", "Shortlisted")).unwrap();

        // then (期待する結果):
        assert_eq!(stale.action, ReconcileAction::Unchanged);
        assert_eq!(live.action, ReconcileAction::AppliedJobsChanged);
        assert_eq!(reconciler.applied().records().len(), 1);
        assert_eq!(reconciler.applied().get("j1").unwrap().status, "Shortlisted");
    }

    #[test]
    fn test_new_application_requests_stats_refetch() {
        // テスト項目: 応募通知は件数を変更せず、統計の再取得を指示する
        // given (前提条件):
        let mut reconciler = Reconciler::new();
        let event = NotificationEvent::NewApplication(NewApplication {
            job_id: "j1".to_string(),
            job_title: Some("Backend".to_string()),
            applicant_id: "u1".to_string(),
            applicant_name: "Dana".to_string(),
            applicant_email: None,
        });

        // when (操作):
        let reconciled = reconciler.apply(None, &event).unwrap();

        // then (期待する結果):
        assert_eq!(reconciled.action, ReconcileAction::RefetchStats);
        assert_eq!(reconciled.toast.title, "New application");
        assert!(reconciler.dashboard().stats().is_none());
    }

    #[test]
    fn test_replayed_event_id_is_skipped() {
        // テスト項目: 同じイベント ID は 2 回目以降スキップされ、ID 無しは毎回適用される
        // given (前提条件):
        let mut reconciler = Reconciler::new();
        let id = Uuid::new_v4();
        let event = NotificationEvent::NewJobPosted(JobRecord::new("j1", "SRE", "Acme"));

        // when (操作):
        let first = reconciler.apply(Some(id), &event);
        let replay = reconciler.apply(Some(id), &event);
        let without_id = reconciler.apply(None, &event);

        // then (期待する結果):
        assert!(first.is_some());
        assert!(replay.is_none());
        assert_eq!(without_id.unwrap().action, ReconcileAction::Unchanged);
    }

    #[test]
    fn test_dedup_window_is_bounded() {
        // テスト項目: ウィンドウを超えた古いイベント ID は忘れられる
        // given (前提条件):
        let mut reconciler = Reconciler::new();
        let event = NotificationEvent::JobDeleted(JobDeleted {
            job_id: "j1".to_string(),
        });
        let oldest = Uuid::new_v4();
        reconciler.apply(Some(oldest), &event);

        // when (操作):
        for _ in 0..DEDUP_WINDOW {
            reconciler.apply(Some(Uuid::new_v4()), &event);
        }

        // then (期待する結果):
        assert_eq!(reconciler.seen.len(), DEDUP_WINDOW);
        assert!(reconciler.apply(Some(oldest), &event).is_some());
    }
}
