use discord_rich_presence::{DiscordIpc, DiscordIpcClient, activity as rich};
use std::fmt::Display;
use std::sync::{Arc, Mutex, TryLockError};
use tracing::{debug, info};

use super::{PresenceClient, RpcError};
use crate::activity::Activity;

type Slot = Option<DiscordIpcClient>;

/// [`PresenceClient`] backed by `discord-rich-presence`.
///
/// The library does blocking socket I/O, so every call runs on tokio's blocking pool.
/// A call that finds the previous one still running fails with [`RpcError::Busy`]
/// instead of queueing behind it.
#[derive(Default)]
pub struct IpcClient {
    inner: Arc<Mutex<Slot>>,
}

impl IpcClient {
    pub fn new() -> Self {
        Self::default()
    }

    async fn blocking<T, F>(&self, call: F) -> Result<T, RpcError>
    where
        F: FnOnce(&mut Slot) -> Result<T, RpcError> + Send + 'static,
        T: Send + 'static,
    {
        let inner = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let mut slot = match inner.try_lock() {
                Ok(slot) => slot,
                Err(TryLockError::WouldBlock) => return Err(RpcError::Busy),
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            };
            call(&mut slot)
        })
        .await?
    }
}

impl PresenceClient for IpcClient {
    async fn login(&mut self, client_id: &str) -> Result<(), RpcError> {
        let id = client_id.to_string();
        self.blocking(move |slot| {
            let mut client = DiscordIpcClient::new(&id).map_err(ipc_error)?;
            // Opens the first free discord-ipc socket and waits for READY.
            client.connect().map_err(ipc_error)?;
            *slot = Some(client);
            Ok(())
        })
        .await?;

        info!(%client_id, "Presence service ready");
        Ok(())
    }

    async fn set_activity(&mut self, activity: &Activity) -> Result<(), RpcError> {
        let activity = activity.clone();
        self.blocking(move |slot| {
            let client = slot.as_mut().ok_or(RpcError::NotConnected)?;
            client
                .set_activity(rich_activity(&activity))
                .map_err(ipc_error)
        })
        .await
    }

    async fn clear_activity(&mut self) -> Result<(), RpcError> {
        self.blocking(|slot| {
            let client = slot.as_mut().ok_or(RpcError::NotConnected)?;
            client.clear_activity().map_err(ipc_error)
        })
        .await
    }

    async fn close(&mut self) -> Result<(), RpcError> {
        self.blocking(|slot| match slot.take() {
            Some(mut client) => {
                client.close().map_err(ipc_error)?;
                debug!("Closed presence service connection");
                Ok(())
            }
            None => Ok(()),
        })
        .await
    }
}

fn rich_activity(activity: &Activity) -> rich::Activity<'_> {
    let mut assets = rich::Assets::new().large_image(activity.large_image_key());
    if let Some(small) = activity.small_image_key() {
        assets = assets.small_image(small);
    }

    let mut payload = rich::Activity::new()
        .timestamps(rich::Timestamps::new().start(activity.start_timestamp()))
        .assets(assets);
    if let Some(state) = activity.state() {
        payload = payload.state(state);
    }
    if let Some(details) = activity.details() {
        payload = payload.details(details);
    }
    payload
}

fn ipc_error(err: impl Display) -> RpcError {
    RpcError::Ipc(err.to_string())
}
