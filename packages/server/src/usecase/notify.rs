//! Event emitter: the only write path into the broker.
//!
//! Route handlers call this after their state mutation has committed.
//! Delivery is best-effort: every method returns the number of connections
//! the frame was enqueued to, and any failure is logged here instead of
//! being returned, so a notification can never fail the request that
//! triggered it.

use std::sync::Arc;

use hirewire_shared::{
    event::{
        ApplicationStatusUpdate, Envelope, JobDeleted, JobRecord, NewApplication,
        NotificationEvent,
    },
    time::Clock,
};

use crate::domain::{Audience, GroupBroker, GroupName, IdentityId, IdentityKey, IdentityKind};

use super::error::{DeliveryError, DispatchError};

#[derive(Clone)]
pub struct NotificationEmitter {
    broker: Arc<dyn GroupBroker>,
    clock: Arc<dyn Clock>,
}

impl NotificationEmitter {
    pub fn new(broker: Arc<dyn GroupBroker>, clock: Arc<dyn Clock>) -> Self {
        Self { broker, clock }
    }

    /// Unicast to every connection of one identity. No-op when it is offline.
    pub fn notify_identity(&self, recipient: &IdentityKey, event: &NotificationEvent) -> usize {
        self.emit(&GroupName::private_for(recipient), event)
    }

    /// Multicast to `admin-room`
    pub fn notify_all_admins(&self, event: &NotificationEvent) -> usize {
        self.emit(&GroupName::shared_for(IdentityKind::Admin), event)
    }

    /// Multicast to `all-users`
    pub fn notify_all_users(&self, event: &NotificationEvent) -> usize {
        self.emit(&GroupName::shared_for(IdentityKind::User), event)
    }

    /// Route an event by its audience.
    ///
    /// `owner` is the user an `application-status-updated` event belongs to.
    /// It is ignored for the broadcast events.
    pub fn dispatch(
        &self,
        event: &NotificationEvent,
        owner: Option<&IdentityId>,
    ) -> Result<usize, DispatchError> {
        match Audience::of(event) {
            Audience::AllUsers => Ok(self.notify_all_users(event)),
            Audience::AllAdmins => Ok(self.notify_all_admins(event)),
            Audience::OwningUser => {
                let owner = owner.ok_or(DispatchError::MissingRecipient(event.name()))?;
                Ok(self.notify_identity(&IdentityKey::user(owner.clone()), event))
            }
        }
    }

    /// A job was posted: tell every user.
    pub fn job_posted(&self, job: JobRecord) -> usize {
        self.notify_all_users(&NotificationEvent::NewJobPosted(job))
    }

    /// A job was deleted: tell every user so open job lists drop it.
    pub fn job_deleted(&self, job_id: impl Into<String>) -> usize {
        self.notify_all_users(&NotificationEvent::JobDeleted(JobDeleted {
            job_id: job_id.into(),
        }))
    }

    /// An admin changed the status of a user's application.
    pub fn application_status_updated(
        &self,
        user_id: &IdentityId,
        update: ApplicationStatusUpdate,
    ) -> usize {
        self.notify_identity(
            &IdentityKey::user(user_id.clone()),
            &NotificationEvent::ApplicationStatusUpdated(update),
        )
    }

    /// A user applied to a job: tell every admin.
    pub fn new_application(&self, application: NewApplication) -> usize {
        self.notify_all_admins(&NotificationEvent::NewApplication(application))
    }

    fn emit(&self, group: &GroupName, event: &NotificationEvent) -> usize {
        match self.try_emit(group, event) {
            Ok(delivered) => {
                tracing::debug!(
                    group = %group,
                    event = %event.name(),
                    delivered,
                    "Notification emitted"
                );
                delivered
            }
            Err(e) => {
                tracing::error!(
                    group = %group,
                    event = %event.name(),
                    "Failed to emit notification: {}",
                    e
                );
                0
            }
        }
    }

    fn try_emit(
        &self,
        group: &GroupName,
        event: &NotificationEvent,
    ) -> Result<usize, DeliveryError> {
        let frame = Envelope::stamp(event, self.clock.now_millis())?.to_json()?;
        Ok(self.broker.publish(group, &frame)?)
    }
}
