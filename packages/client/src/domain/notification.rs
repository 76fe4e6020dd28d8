//! Local notification buffer.

use std::collections::VecDeque;

use uuid::Uuid;

use hirewire_shared::event::NotificationEvent;

/// One received event as the client keeps it.
///
/// `id` is generated locally, so two structurally identical events remain
/// distinct entries. `event_id` is the id the gateway stamped on the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    /// Receive time (Unix milliseconds)
    pub timestamp: i64,
    pub read: bool,
    pub event: NotificationEvent,
    pub event_id: Option<Uuid>,
}

impl Notification {
    pub fn received(event: NotificationEvent, event_id: Option<Uuid>, timestamp: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            read: false,
            event,
            event_id,
        }
    }
}

/// Newest-first list of notifications.
#[derive(Debug, Clone, Default)]
pub struct NotificationBuffer {
    items: VecDeque<Notification>,
}

impl NotificationBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notification: Notification) {
        self.items.push_front(notification);
    }

    /// Snapshot, newest first
    pub fn list(&self) -> Vec<Notification> {
        self.items.iter().cloned().collect()
    }

    pub fn get(&self, id: &Uuid) -> Option<&Notification> {
        self.items.iter().find(|n| &n.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    /// Returns `false` when no notification has that id.
    pub fn mark_read(&mut self, id: &Uuid) -> bool {
        match self.items.iter_mut().find(|n| &n.id == id) {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    /// Returns how many notifications changed from unread to read.
    pub fn mark_all_read(&mut self) -> usize {
        let mut changed = 0;
        for notification in self.items.iter_mut().filter(|n| !n.read) {
            notification.read = true;
            changed += 1;
        }
        changed
    }

    /// Returns `false` when no notification has that id.
    pub fn remove(&mut self, id: &Uuid) -> bool {
        match self.items.iter().position(|n| &n.id == id) {
            Some(index) => self.items.remove(index).is_some(),
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hirewire_shared::event::JobDeleted;

    fn deleted(job_id: &str) -> NotificationEvent {
        NotificationEvent::JobDeleted(JobDeleted {
            job_id: job_id.to_string(),
        })
    }

    #[test]
    fn test_push_keeps_newest_first() {
        // テスト項目: 新しい通知が先頭に並ぶ
        // given (前提条件):
        let mut buffer = NotificationBuffer::new();

        // when (操作):
        buffer.push(Notification::received(deleted("j1"), None, 1000));
        buffer.push(Notification::received(deleted("j2"), None, 2000));

        // then (期待する結果):
        let list = buffer.list();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].event, deleted("j2"));
        assert_eq!(list[1].event, deleted("j1"));
        assert_eq!(buffer.unread_count(), 2);
    }

    #[test]
    fn test_identical_events_stay_distinct() {
        // テスト項目: 同じ内容のイベントでもローカル ID が異なり、別々に既読にできる
        // given (前提条件):
        let mut buffer = NotificationBuffer::new();
        buffer.push(Notification::received(deleted("j1"), None, 1000));
        buffer.push(Notification::received(deleted("j1"), None, 1000));
        let list = buffer.list();

        // when (操作):
        let marked = buffer.mark_read(&list[0].id);

        // then (期待する結果):
        assert!(marked);
        assert_ne!(list[0].id, list[1].id);
        assert_eq!(buffer.unread_count(), 1);
    }

    #[test]
    fn test_mark_all_read_and_remove() {
        // テスト項目: 全既読は変更件数を返し、削除は指定の通知だけを消す
        // given (前提条件):
        let mut buffer = NotificationBuffer::new();
        buffer.push(Notification::received(deleted("j1"), None, 1000));
        buffer.push(Notification::received(deleted("j2"), None, 2000));
        buffer.push(Notification::received(deleted("j3"), None, 3000));
        let target = buffer.list()[1].id;
        buffer.mark_read(&target);

        // when (操作):
        let changed = buffer.mark_all_read();
        let removed = buffer.remove(&target);

        // then (期待する結果):
        assert_eq!(changed, 2);
        assert!(removed);
        assert_eq!(buffer.len(), 2);
        assert!(buffer.get(&target).is_none());
        assert_eq!(buffer.unread_count(), 0);
    }

    #[test]
    fn test_unknown_id_is_a_no_op() {
        // テスト項目: 存在しない ID への操作は false を返し、何も変えない
        // given (前提条件):
        let mut buffer = NotificationBuffer::new();
        buffer.push(Notification::received(deleted("j1"), None, 1000));
        let unknown = Uuid::new_v4();

        // when (操作):
        let marked = buffer.mark_read(&unknown);
        let removed = buffer.remove(&unknown);

        // then (期待する結果):
        assert!(!marked);
        assert!(!removed);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.unread_count(), 1);
    }

    #[test]
    fn test_clear_empties_buffer() {
        // テスト項目: clear で全件が消える
        // given (前提条件):
        let mut buffer = NotificationBuffer::new();
        buffer.push(Notification::received(deleted("j1"), None, 1000));

        // when (操作):
        buffer.clear();

        // then (期待する結果):
        assert!(buffer.is_empty());
        assert_eq!(buffer.unread_count(), 0);
    }
}
