//! Which addressing mode each notification uses.

use hirewire_shared::event::{EventName, NotificationEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    /// Every connected user (`all-users`)
    AllUsers,
    /// Every connected admin (`admin-room`)
    AllAdmins,
    /// The private group of the user the event concerns
    OwningUser,
}

impl Audience {
    pub fn of(event: &NotificationEvent) -> Self {
        Self::of_name(event.name())
    }

    pub fn of_name(name: EventName) -> Self {
        match name {
            EventName::NewJobPosted | EventName::JobDeleted => Audience::AllUsers,
            EventName::ApplicationStatusUpdated => Audience::OwningUser,
            EventName::NewApplication => Audience::AllAdmins,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audience_table() {
        // テスト項目: 各イベントが決められた宛先モードに対応する
        // given (前提条件) / when (操作) / then (期待する結果):
        assert_eq!(Audience::of_name(EventName::NewJobPosted), Audience::AllUsers);
        assert_eq!(Audience::of_name(EventName::JobDeleted), Audience::AllUsers);
        assert_eq!(
            Audience::of_name(EventName::ApplicationStatusUpdated),
            Audience::OwningUser
        );
        assert_eq!(Audience::of_name(EventName::NewApplication), Audience::AllAdmins);
    }
}
