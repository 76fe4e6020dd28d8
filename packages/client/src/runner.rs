//! Interactive client: prints toasts as events arrive and reads commands.

use std::sync::Arc;

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{
    sync::{
        broadcast::{self, error::RecvError},
        mpsc,
    },
    task::JoinHandle,
};

use crate::{
    command::Command,
    domain::{ReconnectPolicy, SessionCredential},
    error::ClientError,
    formatter::NotificationFormatter,
    reconcile::{HttpSnapshotSource, LiveView, Toast},
    subscriber::{NotificationSubscriber, SubscriberEvent},
    ui::redisplay_prompt,
};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Gateway WebSocket URL
    pub url: String,
    pub credential: SessionCredential,
    pub policy: ReconnectPolicy,
    /// REST API origin. Without it, events are shown but no state is refetched.
    pub api_url: Option<String>,
}

/// Run the client until `quit`, EOF, or the session gives up.
///
/// # Errors
///
/// Returns the error that ended the session: a rejected credential or
/// exhausted reconnect attempts.
pub async fn run_client(config: ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    let prompt = format!("{}> ", config.credential);
    let subscriber = NotificationSubscriber::new(config.url.clone(), config.policy);

    let view = config.api_url.as_ref().map(|api_url| {
        LiveView::new(
            config.credential.role,
            Arc::new(HttpSnapshotSource::new(
                api_url.clone(),
                config.credential.token.clone(),
            )),
        )
    });
    let printer = spawn_event_printer(subscriber.subscribe_events(), view, prompt.clone());
    let mut session_events = subscriber.subscribe_events();

    tracing::info!("Subscribing to {} as {}", config.url, config.credential);
    subscriber.set_identity(Some(config.credential.clone()));
    println!("\nYou are '{}'. Type 'help' for commands.\n", config.credential);

    let mut input_rx = spawn_readline(prompt.clone());

    let result: Result<(), ClientError> = loop {
        tokio::select! {
            line = input_rx.recv() => {
                let Some(line) = line else {
                    break Ok(());
                };
                match Command::parse(&line) {
                    Ok(Command::Quit) => break Ok(()),
                    Ok(command) => print!("{}", execute_command(&subscriber, command)),
                    Err(e) => print!("{}", NotificationFormatter::format_error(&e.to_string())),
                }
                redisplay_prompt(&prompt);
            }
            event = session_events.recv() => {
                if let Ok(SubscriberEvent::SessionEnded(Some(error))) = event {
                    break Err(error);
                }
            }
        }
    };

    subscriber.disconnect();
    printer.abort();
    result.map_err(Into::into)
}

/// Apply one command to the subscriber and return the text to print.
pub fn execute_command(subscriber: &NotificationSubscriber, command: Command) -> String {
    match command {
        Command::List => {
            NotificationFormatter::format_notification_list(&subscriber.notifications())
        }
        Command::Read(position) => match nth_id(subscriber, position) {
            Some(id) if subscriber.mark_read(&id) => format!("marked #{position} as read\n"),
            _ => NotificationFormatter::format_error(&format!("no notification #{position}")),
        },
        Command::ReadAll => format!("marked {} as read\n", subscriber.mark_all_read()),
        Command::Remove(position) => match nth_id(subscriber, position) {
            Some(id) if subscriber.remove(&id) => format!("removed #{position}\n"),
            _ => NotificationFormatter::format_error(&format!("no notification #{position}")),
        },
        Command::Clear => {
            subscriber.clear();
            "cleared\n".to_string()
        }
        Command::Status => {
            let notifications = subscriber.notifications();
            NotificationFormatter::format_status(
                subscriber.state(),
                subscriber.unread_count(),
                notifications.len(),
                subscriber.last_error().as_ref(),
            )
        }
        Command::Help => NotificationFormatter::format_help(),
        Command::Quit => String::new(),
    }
}

fn nth_id(subscriber: &NotificationSubscriber, position: usize) -> Option<uuid::Uuid> {
    subscriber
        .notifications()
        .get(position.checked_sub(1)?)
        .map(|notification| notification.id)
}

/// Spawns a task that prints toasts and state changes as they happen.
fn spawn_event_printer(
    mut events: broadcast::Receiver<SubscriberEvent>,
    mut view: Option<LiveView>,
    prompt: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Missed {} events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            let toast = match view.as_mut() {
                Some(view) => view.handle(&event).await,
                None => match &event {
                    SubscriberEvent::Received(notification) => {
                        Some(Toast::for_event(&notification.event))
                    }
                    _ => None,
                },
            };

            let output = match (&event, toast) {
                (SubscriberEvent::Received(notification), Some(toast)) => Some(
                    NotificationFormatter::format_toast(&toast, notification.timestamp),
                ),
                (SubscriberEvent::StateChanged(state), _) => {
                    Some(NotificationFormatter::format_state_change(*state))
                }
                _ => None,
            };
            if let Some(output) = output {
                print!("{}", output);
                redisplay_prompt(&prompt);
            }
        }
    })
}

/// Spawn a blocking thread for rustyline (synchronous readline)
fn spawn_readline(prompt: String) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_subscriber() -> NotificationSubscriber {
        NotificationSubscriber::new("ws://127.0.0.1:1/ws", ReconnectPolicy::default())
    }

    #[test]
    fn test_commands_on_empty_buffer() {
        // テスト項目: 通知が無い状態で番号指定のコマンドはエラー表示になる
        // given (前提条件):
        let subscriber = create_test_subscriber();

        // when (操作):
        let read = execute_command(&subscriber, Command::Read(1));
        let remove = execute_command(&subscriber, Command::Remove(1));
        let read_all = execute_command(&subscriber, Command::ReadAll);

        // then (期待する結果):
        assert!(read.contains("no notification #1"));
        assert!(remove.contains("no notification #1"));
        assert_eq!(read_all, "marked 0 as read\n");
    }

    #[test]
    fn test_status_and_list_output() {
        // テスト項目: status と list が未接続の状態を表示する
        // given (前提条件):
        let subscriber = create_test_subscriber();

        // when (操作):
        let status = execute_command(&subscriber, Command::Status);
        let list = execute_command(&subscriber, Command::List);

        // then (期待する結果):
        assert!(status.contains("state: disconnected"));
        assert!(list.contains("(No notifications)"));
    }
}
