//! Toast text for each event kind.

use std::fmt;

use hirewire_shared::event::NotificationEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Toast {
    pub fn for_event(event: &NotificationEvent) -> Self {
        match event {
            NotificationEvent::NewJobPosted(job) => {
                let message = if job.company_name.is_empty() {
                    job.title.clone()
                } else {
                    format!("{} at {}", job.title, job.company_name)
                };
                Self {
                    title: "New job posted".to_string(),
                    message,
                    severity: Severity::Info,
                }
            }
            NotificationEvent::JobDeleted(_) => Self {
                title: "Job removed".to_string(),
                message: "A job listing is no longer available".to_string(),
                severity: Severity::Warning,
            },
            NotificationEvent::ApplicationStatusUpdated(update) => Self {
                title: "Application update".to_string(),
                message: format!(
                    "Your application for {} at {} is now {}",
                    update.job_title, update.company_name, update.status
                ),
                severity: if update.status.eq_ignore_ascii_case("rejected") {
                    Severity::Warning
                } else {
                    Severity::Success
                },
            },
            NotificationEvent::NewApplication(application) => Self {
                title: "New application".to_string(),
                message: format!(
                    "{} applied for {}",
                    application.applicant_name,
                    application.job_title.as_deref().unwrap_or("a job")
                ),
                severity: Severity::Info,
            },
        }
    }
}
