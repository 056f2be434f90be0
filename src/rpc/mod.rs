pub mod ipc;

pub use ipc::IpcClient;

use crate::activity::Activity;

#[derive(thiserror::Error, Debug)]
pub enum RpcError {
    #[error("Not connected to the presence service")]
    NotConnected,
    #[error("Presence client is still busy with an earlier call")]
    Busy,
    #[error("Discord IPC error: {0}")]
    Ipc(String),
    #[error("Presence client task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Client side of the presence service.
///
/// A session calls `login` once and `set_activity` on every push.
pub trait PresenceClient: Send + 'static {
    /// Connects to the locally running service and authenticates as `client_id`.
    /// Resolves once the service reports it is ready.
    fn login(&mut self, client_id: &str) -> impl Future<Output = Result<(), RpcError>> + Send;

    fn set_activity(
        &mut self,
        activity: &Activity,
    ) -> impl Future<Output = Result<(), RpcError>> + Send;

    /// Removes whatever activity this client last set.
    fn clear_activity(&mut self) -> impl Future<Output = Result<(), RpcError>> + Send;

    fn close(&mut self) -> impl Future<Output = Result<(), RpcError>> + Send;
}
