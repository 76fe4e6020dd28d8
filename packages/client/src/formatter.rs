//! Text formatting for the CLI.

use hirewire_shared::time::millis_to_rfc3339;

use crate::{
    domain::{ConnectionState, Notification},
    error::ClientError,
    reconcile::Toast,
};

const SEPARATOR: &str = "============================================================";

/// Notification formatter for client display
pub struct NotificationFormatter;

impl NotificationFormatter {
    /// Format a toast raised by a pushed event
    ///
    /// # Arguments
    ///
    /// * `toast` - The toast to show
    /// * `received_at` - Unix timestamp when the event arrived (milliseconds)
    pub fn format_toast(toast: &Toast, received_at: i64) -> String {
        format!(
            "\n[{}] {}: {}\n    received at {}\n",
            toast.severity,
            toast.title,
            toast.message,
            millis_to_rfc3339(received_at)
        )
    }

    /// Format the buffer, newest first, numbered from 1
    pub fn format_notification_list(notifications: &[Notification]) -> String {
        let mut output = String::new();
        output.push_str(&format!("\n{SEPARATOR}\n"));
        output.push_str("Notifications:\n");

        if notifications.is_empty() {
            output.push_str("(No notifications)\n");
        } else {
            for (index, notification) in notifications.iter().enumerate() {
                let toast = Toast::for_event(&notification.event);
                let marker = if notification.read { " " } else { "*" };
                output.push_str(&format!(
                    "{marker} {}. {}: {} ({})\n",
                    index + 1,
                    toast.title,
                    toast.message,
                    millis_to_rfc3339(notification.timestamp)
                ));
            }
        }

        output.push_str(&format!("{SEPARATOR}\n"));
        output
    }

    pub fn format_state_change(state: ConnectionState) -> String {
        format!("\n~ {state}\n")
    }

    pub fn format_status(
        state: ConnectionState,
        unread: usize,
        total: usize,
        last_error: Option<&ClientError>,
    ) -> String {
        let mut output = format!("state: {state}\nnotifications: {total} ({unread} unread)\n");
        if let Some(error) = last_error {
            output.push_str(&format!("last error: {error}\n"));
        }
        output
    }

    pub fn format_help() -> String {
        [
            "Commands:",
            "  list        show notifications (* = unread)",
            "  read <n>    mark notification n as read",
            "  read-all    mark every notification as read",
            "  remove <n>  delete notification n",
            "  clear       delete every notification",
            "  status      show connection state",
            "  quit        exit",
            "",
        ]
        .join("\n")
    }

    pub fn format_error(message: &str) -> String {
        format!("! {message}\n")
    }
}
