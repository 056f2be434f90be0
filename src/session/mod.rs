pub mod fsm;

pub use fsm::{ConnectionState, Event, SessionState};

use std::sync::Arc;
use std::time::Duration;
use tokio::{
    sync::{Mutex, watch},
    task::JoinHandle,
    time::{MissedTickBehavior, timeout},
};
use tracing::{debug, error, info, warn};

use crate::activity::ActivityCache;
use crate::config::ReporterConfig;
use crate::editor::EditorState;
use crate::rpc::PresenceClient;
use fsm::wait_until_ready;

type SharedClient<C> = Arc<Mutex<C>>;

/// Upper bound for each best-effort teardown call in [`PresenceSession::stop`].
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

// +----------------+                 +------------------+                 +-----------------+
// |  Editor        |                 |  PresenceSession |                 |  Presence       |
// |  (EditorState) |                 |  (push loop)     |                 |  service (IPC)  |
// +-------+--------+                 +--------+---------+                 +--------+--------+
//         |                                   |  login (connect + handshake)       |
//         |                                   | -------------------------------->  |
//         |                                   |                  READY             |
//         |                                   | <--------------------------------  |
//         |   ActivityCache::current()        |                                    |
//         | <-------------------------------  |  SET_ACTIVITY (now, then per tick) |
//         |                                   | -------------------------------->  |

/// Keeps the presence service up to date with the editor's activity.
///
/// Construction starts logging in in the background and never fails: a session that
/// cannot reach the service logs the error and simply never becomes ready.
pub struct PresenceSession<C: PresenceClient> {
    client: SharedClient<C>,
    config: ReporterConfig,
    state: SessionState,
    shutdown_tx: watch::Sender<bool>,
    login_task: JoinHandle<()>,
    push_task: Option<JoinHandle<()>>,
}

impl<C: PresenceClient> PresenceSession<C> {
    /// Must be called from within a tokio runtime.
    pub fn new(client: C, config: ReporterConfig) -> Self {
        info!(client_id = %config.client_id(), "Creating presence session");

        let client = Arc::new(Mutex::new(client));
        let state = SessionState::new();
        let (shutdown_tx, _) = watch::channel(false);

        let login_task = tokio::spawn(login(
            client.clone(),
            config.client_id().to_string(),
            state.clone(),
        ));

        Self {
            client,
            config,
            state,
            shutdown_tx,
            login_task,
            push_task: None,
        }
    }

    /// Pushes `editor`'s activity once the session is ready, then again every update interval.
    ///
    /// Calling `start` again replaces the previous push loop.
    pub fn start<E>(&mut self, editor: E)
    where
        E: EditorState + 'static,
    {
        if let Some(previous) = self.push_task.take() {
            warn!(client_id = %self.config.client_id(), "Presence session already started, replacing push loop");
            previous.abort();
        }

        self.push_task = Some(tokio::spawn(push_loop(
            self.client.clone(),
            ActivityCache::new(editor),
            self.state.subscribe(),
            self.config.update_interval(),
            self.shutdown_tx.subscribe(),
        )));
    }

    pub fn state(&self) -> ConnectionState {
        self.state.state()
    }

    /// Stops pushing, clears the activity shown remotely and closes the connection.
    pub async fn stop(mut self) {
        let client_id = self.config.client_id().to_string();
        let was_ready = self.state.state().is_ready();
        self.shutdown_tx.send_replace(true);

        // A pending login or push holds the client lock; abort both before taking it ourselves.
        self.login_task.abort();
        let _ = (&mut self.login_task).await;
        if let Some(push_task) = self.push_task.take() {
            push_task.abort();
            if let Err(e) = push_task.await {
                if e.is_panic() {
                    error!(%client_id, "Push loop panicked: {}", e);
                }
            }
        }
        self.state.update(Event::Close);

        let mut client = self.client.lock().await;
        if was_ready {
            match timeout(SHUTDOWN_TIMEOUT, client.clear_activity()).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => debug!(%client_id, "Ignoring error clearing activity during shutdown: {}", e),
                Err(_) => debug!(%client_id, "Gave up clearing activity during shutdown"),
            }
        }
        match timeout(SHUTDOWN_TIMEOUT, client.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(%client_id, "Ignoring error closing presence client: {}", e),
            Err(_) => debug!(%client_id, "Gave up closing presence client"),
        }
        info!(%client_id, "Presence session stopped");
    }
}

async fn login<C: PresenceClient>(client: SharedClient<C>, client_id: String, state: SessionState) {
    state.update(Event::Connect);
    let mut client = client.lock().await;

    match client.login(&client_id).await {
        Ok(()) => {
            debug!(%client_id, "Logged in to presence service");
            state.update(Event::LoggedIn);
        }
        Err(e) => {
            error!(%client_id, "Failed to log in to presence service: {}", e);
            state.update(Event::Failure);
        }
    }
}

async fn push_loop<C, E>(
    client: SharedClient<C>,
    mut cache: ActivityCache<E>,
    mut ready_rx: watch::Receiver<ConnectionState>,
    update_interval: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    C: PresenceClient,
    E: EditorState,
{
    tokio::select! {
        ready = wait_until_ready(&mut ready_rx) => {
            if !ready {
                debug!("Presence session will never become ready, no activity will be pushed");
                return;
            }
        }
        _ = stop_requested(&mut shutdown_rx) => {
            debug!("Push loop stopped before the session became ready");
            return;
        }
    }

    info!(
        interval_ms = update_interval.as_millis() as u64,
        "Presence session ready. Updating activity every {}s",
        update_interval.as_secs_f64()
    );

    // The first tick completes immediately, which is the initial push.
    let mut interval = tokio::time::interval(update_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // A pending stop wins over a due tick.
            biased;
            _ = stop_requested(&mut shutdown_rx) => {
                debug!("Push loop received shutdown signal");
                break;
            }
            _ = interval.tick() => {
                let activity = cache.current();
                let mut client = client.lock().await;
                // A push still unanswered when the next one is due is abandoned.
                match timeout(update_interval, client.set_activity(activity)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        warn!(state = ?activity.state(), details = ?activity.details(), "Failed to push activity: {}", e);
                    }
                    Err(_) => {
                        warn!(state = ?activity.state(), details = ?activity.details(), "Presence service did not answer the push in time");
                    }
                }
            }
        }
    }
}

/// Resolves once `stop` was requested. A dropped session handle never stops the loop.
async fn stop_requested(shutdown_rx: &mut watch::Receiver<bool>) {
    let stopped = shutdown_rx.wait_for(|stop| *stop).await.is_ok();
    if !stopped {
        std::future::pending::<()>().await;
    }
}
