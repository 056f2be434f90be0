use std::sync::Arc;
use tokio::sync::watch;
use tracing::trace;

// --- FSM Types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Ready,
    Failed,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Connect,
    LoggedIn,
    Failure,
    Close,
}

// --- FSM Implementation ---

impl ConnectionState {
    pub fn on_event(self, event: Event) -> ConnectionState {
        match (self, event) {
            (ConnectionState::Idle, Event::Connect) => ConnectionState::Connecting,
            (ConnectionState::Connecting, Event::LoggedIn) => ConnectionState::Ready,
            (ConnectionState::Connecting, Event::Failure) => ConnectionState::Failed,
            (_, Event::Close) => ConnectionState::Closed,

            // Default: remain in current state. No retries, so Failed is final.
            (state, _) => state,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ConnectionState::Ready)
    }

    /// States the session can never become ready from.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ConnectionState::Failed | ConnectionState::Closed)
    }
}

// --- Shared state ---

/// Connection state shared between the connect task, the push loop and the session handle.
#[derive(Debug, Clone)]
pub struct SessionState {
    sender: Arc<watch::Sender<ConnectionState>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(ConnectionState::Idle);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn state(&self) -> ConnectionState {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.sender.subscribe()
    }

    pub fn update(&self, event: Event) -> ConnectionState {
        self.sender.send_modify(|state| {
            let next = state.on_event(event);
            trace!(from = ?state, to = ?next, ?event, "Connection state transition");
            *state = next;
        });
        self.state()
    }
}

/// Waits until the session is ready. Returns `false` once readiness has become impossible.
pub async fn wait_until_ready(receiver: &mut watch::Receiver<ConnectionState>) -> bool {
    match receiver
        .wait_for(|state| state.is_ready() || state.is_terminal())
        .await
    {
        Ok(state) => state.is_ready(),
        Err(_) => false,
    }
}
