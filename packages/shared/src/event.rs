//! Notification events and the frame that carries them over the socket.
//!
//! Every frame is one JSON text message:
//!
//! ```text
//! {"id":"<uuid>","emittedAt":1700000000000,"event":"new-job-posted","data":{...}}
//! ```
//!
//! `id` and `emittedAt` are stamped by the emitter. Older producers may omit
//! them, so both are optional on the way in.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

/// Wire name of a notification event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventName {
    NewJobPosted,
    JobDeleted,
    ApplicationStatusUpdated,
    NewApplication,
}

impl EventName {
    pub const ALL: [EventName; 4] = [
        EventName::NewJobPosted,
        EventName::JobDeleted,
        EventName::ApplicationStatusUpdated,
        EventName::NewApplication,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::NewJobPosted => "new-job-posted",
            EventName::JobDeleted => "job-deleted",
            EventName::ApplicationStatusUpdated => "application-status-updated",
            EventName::NewApplication => "new-application",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown event name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event name '{0}'")]
pub struct UnknownEventName(pub String);

impl FromStr for EventName {
    type Err = UnknownEventName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownEventName(s.to_string()))
    }
}

/// Job record as stored by the job service.
///
/// Only the fields the notification layer reads are typed. Everything else
/// the producer sends is kept in `extra` and forwarded untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl JobRecord {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        company_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company_name: company_name.into(),
            location: None,
            job_type: None,
            description: None,
            deadline: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDeleted {
    pub job_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusUpdate {
    pub job_id: String,
    pub status: String,
    pub job_title: String,
    pub company_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    pub applicant_id: String,
    pub applicant_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applicant_email: Option<String>,
}

/// The four notifications the gateway pushes
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    NewJobPosted(JobRecord),
    JobDeleted(JobDeleted),
    ApplicationStatusUpdated(ApplicationStatusUpdate),
    NewApplication(NewApplication),
}

impl NotificationEvent {
    pub fn name(&self) -> EventName {
        match self {
            NotificationEvent::NewJobPosted(_) => EventName::NewJobPosted,
            NotificationEvent::JobDeleted(_) => EventName::JobDeleted,
            NotificationEvent::ApplicationStatusUpdated(_) => EventName::ApplicationStatusUpdated,
            NotificationEvent::NewApplication(_) => EventName::NewApplication,
        }
    }

    /// Job the event refers to. Every variant carries one.
    pub fn job_id(&self) -> &str {
        match self {
            NotificationEvent::NewJobPosted(job) => &job.id,
            NotificationEvent::JobDeleted(deleted) => &deleted.job_id,
            NotificationEvent::ApplicationStatusUpdated(update) => &update.job_id,
            NotificationEvent::NewApplication(application) => &application.job_id,
        }
    }

    /// Serialize the payload alone (the `data` field of a frame)
    pub fn to_data(&self) -> Result<Value, serde_json::Error> {
        match self {
            NotificationEvent::NewJobPosted(job) => serde_json::to_value(job),
            NotificationEvent::JobDeleted(deleted) => serde_json::to_value(deleted),
            NotificationEvent::ApplicationStatusUpdated(update) => serde_json::to_value(update),
            NotificationEvent::NewApplication(application) => serde_json::to_value(application),
        }
    }

    /// Rebuild an event from its wire name and payload
    pub fn from_parts(name: EventName, data: Value) -> Result<Self, serde_json::Error> {
        Ok(match name {
            EventName::NewJobPosted => {
                NotificationEvent::NewJobPosted(serde_json::from_value(data)?)
            }
            EventName::JobDeleted => NotificationEvent::JobDeleted(serde_json::from_value(data)?),
            EventName::ApplicationStatusUpdated => {
                NotificationEvent::ApplicationStatusUpdated(serde_json::from_value(data)?)
            }
            EventName::NewApplication => {
                NotificationEvent::NewApplication(serde_json::from_value(data)?)
            }
        })
    }
}

/// One frame on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emitted_at: Option<i64>,
    pub event: EventName,
    pub data: Value,
}

impl Envelope {
    /// Wrap an event, stamping it with a fresh event id.
    pub fn stamp(event: &NotificationEvent, emitted_at: i64) -> Result<Self, serde_json::Error> {
        Ok(Self {
            id: Some(Uuid::new_v4()),
            emitted_at: Some(emitted_at),
            event: event.name(),
            data: event.to_data()?,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Decode the payload into the typed event named by `event`
    pub fn decode(&self) -> Result<NotificationEvent, serde_json::Error> {
        NotificationEvent::from_parts(self.event, self.data.clone())
    }
}
