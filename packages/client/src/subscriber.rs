//! Client subscriber: one live session to the gateway per logged-in identity.
//!
//! The subscriber owns the connection task, the notification buffer and a
//! broadcast channel that local listeners (toasts, reconciliation) read.
//! Every session started gets a fresh generation number. Frames and state
//! changes coming from a task whose generation is no longer current are
//! dropped, so nothing read by a superseded connection reaches the buffer of
//! the session that replaced it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::StreamExt;
use tokio::{sync::broadcast, task::JoinHandle};
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use hirewire_shared::{
    event::Envelope,
    time::{Clock, SystemClock},
};

use crate::{
    domain::{
        ConnectionState, Notification, NotificationBuffer, ReconnectPolicy, SessionCredential,
    },
    error::ClientError,
    transport::{self, GatewayStream},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq)]
pub enum SubscriberEvent {
    /// A notification was appended to the buffer
    Received(Notification),
    StateChanged(ConnectionState),
    /// The session stopped retrying. Only a new `set_identity` restarts it.
    SessionEnded(Option<ClientError>),
}

struct Inner {
    generation: u64,
    credential: Option<SessionCredential>,
    state: ConnectionState,
    buffer: NotificationBuffer,
    last_error: Option<ClientError>,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    url: String,
    policy: ReconnectPolicy,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
    events: broadcast::Sender<SubscriberEvent>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, inner: &mut Inner, state: ConnectionState) {
        if inner.state != state {
            inner.state = state;
            let _ = self.events.send(SubscriberEvent::StateChanged(state));
        }
    }

    /// Abort the running session and flip to `Disconnected`. Idempotent.
    fn teardown(&self, inner: &mut Inner) {
        inner.generation += 1;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        self.set_state(inner, ConnectionState::Disconnected);
    }

    fn token_for(&self, generation: u64) -> Option<String> {
        let inner = self.lock();
        if inner.generation != generation {
            return None;
        }
        inner.credential.as_ref().map(|c| c.token.clone())
    }

    /// Apply a state change reported by the session task.
    ///
    /// Returns `false` when the task was superseded and must stop.
    fn transition(
        &self,
        generation: u64,
        state: ConnectionState,
        error: Option<ClientError>,
    ) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation {
            return false;
        }
        if state.is_connected() {
            inner.last_error = None;
        }
        if error.is_some() {
            inner.last_error = error;
        }
        self.set_state(&mut inner, state);
        true
    }

    fn finish(&self, generation: u64, error: Option<ClientError>) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }
        inner.task = None;
        self.set_state(&mut inner, ConnectionState::Disconnected);
        let _ = self.events.send(SubscriberEvent::SessionEnded(error));
    }

    fn record(&self, generation: u64, text: &str) {
        let envelope = match Envelope::from_json(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!("Ignoring malformed frame: {}", e);
                return;
            }
        };
        let event = match envelope.decode() {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(
                    event = %envelope.event,
                    "Ignoring frame with invalid payload: {}",
                    e
                );
                return;
            }
        };
        let notification = Notification::received(event, envelope.id, self.clock.now_millis());

        let mut inner = self.lock();
        if inner.generation != generation || !inner.state.is_connected() {
            tracing::debug!(event = %envelope.event, "Dropping frame from a superseded session");
            return;
        }
        inner.buffer.push(notification.clone());
        let _ = self.events.send(SubscriberEvent::Received(notification));
    }
}

/// Per-session client connection with a local notification buffer.
///
/// `set_identity` must be called from within a Tokio runtime, since it
/// spawns the connection task.
pub struct NotificationSubscriber {
    shared: Arc<Shared>,
}

impl NotificationSubscriber {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self::with_clock(url, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        url: impl Into<String>,
        policy: ReconnectPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                url: url.into(),
                policy,
                clock,
                inner: Mutex::new(Inner {
                    generation: 0,
                    credential: None,
                    state: ConnectionState::Disconnected,
                    buffer: NotificationBuffer::new(),
                    last_error: None,
                    task: None,
                }),
                events,
            }),
        }
    }

    /// Log in, log out, or switch identity.
    ///
    /// A different identity (or `None`) tears the current session down and
    /// clears the buffer before anything else happens. The same identity with
    /// a new token only replaces the token used by later reconnects, and
    /// restarts the session if it had stopped.
    pub fn set_identity(&self, credential: Option<SessionCredential>) {
        let mut inner = self.shared.lock();
        let unchanged = match (&inner.credential, &credential) {
            (Some(current), Some(next)) => current.same_identity(next),
            (None, None) => true,
            _ => false,
        };

        if unchanged {
            inner.credential = credential;
            let running = inner.task.as_ref().is_some_and(|task| !task.is_finished());
            if inner.credential.is_some() && !running {
                self.start_session(&mut inner);
            }
            return;
        }

        tracing::info!(
            from = ?inner.credential.as_ref().map(ToString::to_string),
            to = ?credential.as_ref().map(ToString::to_string),
            "Identity changed, resetting session"
        );
        self.shared.teardown(&mut inner);
        inner.buffer.clear();
        inner.last_error = None;
        inner.credential = credential;
        if inner.credential.is_some() {
            self.start_session(&mut inner);
        }
    }

    fn start_session(&self, inner: &mut Inner) {
        inner.generation += 1;
        let generation = inner.generation;
        self.shared.set_state(inner, ConnectionState::Connecting);
        inner.task = Some(tokio::spawn(run_session(self.shared.clone(), generation)));
    }

    /// Close the connection now. Safe to call any number of times.
    pub fn disconnect(&self) {
        let mut inner = self.shared.lock();
        self.shared.teardown(&mut inner);
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.lock().state
    }

    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    pub fn last_error(&self) -> Option<ClientError> {
        self.shared.lock().last_error.clone()
    }

    pub fn credential(&self) -> Option<SessionCredential> {
        self.shared.lock().credential.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SubscriberEvent> {
        self.shared.events.subscribe()
    }

    /// Newest first
    pub fn notifications(&self) -> Vec<Notification> {
        self.shared.lock().buffer.list()
    }

    pub fn unread_count(&self) -> usize {
        self.shared.lock().buffer.unread_count()
    }

    pub fn mark_read(&self, id: &Uuid) -> bool {
        self.shared.lock().buffer.mark_read(id)
    }

    pub fn mark_all_read(&self) -> usize {
        self.shared.lock().buffer.mark_all_read()
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        self.shared.lock().buffer.remove(id)
    }

    pub fn clear(&self) {
        self.shared.lock().buffer.clear();
    }
}

impl Drop for NotificationSubscriber {
    fn drop(&mut self) {
        self.disconnect();
    }
}

async fn run_session(shared: Arc<Shared>, generation: u64) {
    let mut attempt = 0;

    loop {
        let Some(token) = shared.token_for(generation) else {
            return;
        };

        tracing::info!(
            "Connecting to {} (attempt {}/{})",
            shared.url,
            attempt + 1,
            shared.policy.max_attempts() + 1
        );
        let error = match transport::connect(&shared.url, &token).await {
            Ok(stream) => {
                if !shared.transition(generation, ConnectionState::Connected, None) {
                    return;
                }
                tracing::info!("Connected to notification gateway");
                attempt = 0;
                match read_frames(&shared, generation, stream).await {
                    Ok(()) => ClientError::ConnectionLost("server closed the connection".into()),
                    Err(e) => e,
                }
            }
            Err(e) => e,
        };

        if !shared.transition(generation, ConnectionState::Disconnected, Some(error.clone())) {
            return;
        }
        if !shared.policy.should_attempt_reconnect(&error, attempt) {
            tracing::error!("Giving up on notification gateway: {}", error);
            shared.finish(generation, Some(error));
            return;
        }

        attempt += 1;
        tracing::warn!(
            "{}. Reconnecting in {:?}... (attempt {}/{})",
            error,
            shared.policy.interval(),
            attempt,
            shared.policy.max_attempts()
        );
        tokio::time::sleep(shared.policy.interval()).await;

        if !shared.transition(generation, ConnectionState::Connecting, None) {
            return;
        }
    }
}

/// Read frames until the server closes the connection (`Ok`) or it breaks (`Err`).
async fn read_frames(
    shared: &Shared,
    generation: u64,
    mut stream: GatewayStream,
) -> Result<(), ClientError> {
    while let Some(message) = stream.next().await {
        match message.map_err(|e| ClientError::ConnectionLost(e.to_string()))? {
            Message::Text(text) => shared.record(generation, text.as_str()),
            Message::Close(frame) => {
                tracing::debug!(?frame, "Server closed the connection");
                return Ok(());
            }
            _ => {}
        }
    }
    Ok(())
}
