use editor_presence::{
    activity::Activity,
    config::ReporterConfig,
    editor::{EditorUpdate, SharedEditorState},
    rpc::{PresenceClient, RpcError},
    session::{ConnectionState, PresenceSession},
};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

const CLIENT_ID: &str = "383226320970055681";

// --- Fake presence client ---

struct FakeClient {
    fail_pushes: bool,
    // The next `hang_pushes` pushes are recorded but never answered.
    hang_pushes: u32,
    // `login` resolves with whatever the test sends; a dropped sender means "never ready".
    ready: Option<oneshot::Receiver<Result<(), RpcError>>>,
    pushes: mpsc::UnboundedSender<Activity>,
    cleared: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

struct Harness {
    ready: oneshot::Sender<Result<(), RpcError>>,
    pushes: mpsc::UnboundedReceiver<Activity>,
    cleared: Arc<AtomicBool>,
    closed: Arc<AtomicBool>,
}

fn fake_client() -> (FakeClient, Harness) {
    let (ready_tx, ready_rx) = oneshot::channel();
    let (push_tx, push_rx) = mpsc::unbounded_channel();
    let cleared = Arc::new(AtomicBool::new(false));
    let closed = Arc::new(AtomicBool::new(false));

    let client = FakeClient {
        fail_pushes: false,
        hang_pushes: 0,
        ready: Some(ready_rx),
        pushes: push_tx,
        cleared: cleared.clone(),
        closed: closed.clone(),
    };
    let harness = Harness {
        ready: ready_tx,
        pushes: push_rx,
        cleared,
        closed,
    };
    (client, harness)
}

impl PresenceClient for FakeClient {
    async fn login(&mut self, client_id: &str) -> Result<(), RpcError> {
        assert_eq!(client_id, CLIENT_ID);
        let Some(ready) = self.ready.take() else {
            return Ok(());
        };
        match ready.await {
            Ok(result) => result,
            Err(_) => std::future::pending().await,
        }
    }

    async fn set_activity(&mut self, activity: &Activity) -> Result<(), RpcError> {
        let _ = self.pushes.send(activity.clone());
        if self.hang_pushes > 0 {
            self.hang_pushes -= 1;
            std::future::pending::<()>().await;
        }
        if self.fail_pushes {
            return Err(RpcError::Ipc("rate limited".to_string()));
        }
        Ok(())
    }

    async fn clear_activity(&mut self) -> Result<(), RpcError> {
        self.cleared.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), RpcError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

// --- Helpers ---

fn project_editor() -> EditorUpdate {
    EditorUpdate {
        uri: Some("file:///home/user/project/main.rs".to_string()),
        root: Some("/home/user/project".to_string()),
    }
}

fn config(interval_ms: u64) -> ReporterConfig {
    ReporterConfig::new(CLIENT_ID).with_update_interval_ms(Some(interval_ms))
}

async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

// --- Tests ---

#[tokio::test(start_paused = true)]
async fn pushes_once_on_ready_then_once_per_interval() {
    let (client, mut harness) = fake_client();
    let mut session = PresenceSession::new(client, config(5000));
    session.start(project_editor());

    settle().await;
    assert!(harness.pushes.try_recv().is_err(), "pushed before ready");

    harness.ready.send(Ok(())).unwrap();
    let first = harness.pushes.recv().await.unwrap();
    assert_eq!(session.state(), ConnectionState::Ready);
    assert_eq!(first.details(), Some("Editing main.rs"));
    assert_eq!(first.state(), Some("On project"));

    tokio::time::advance(Duration::from_millis(4_999)).await;
    settle().await;
    assert!(harness.pushes.try_recv().is_err(), "pushed before the interval elapsed");

    tokio::time::advance(Duration::from_millis(1)).await;
    let second = harness.pushes.recv().await.unwrap();
    settle().await;
    assert!(harness.pushes.try_recv().is_err(), "more than one push per interval");

    // Nothing changed in the editor, so the cached snapshot is re-sent as is.
    assert_eq!(first, second);
    assert_eq!(first.start_timestamp(), second.start_timestamp());
}

#[tokio::test(start_paused = true)]
async fn editor_changes_show_up_on_the_next_tick() {
    let (client, mut harness) = fake_client();
    let editor = SharedEditorState::new(project_editor());
    let mut session = PresenceSession::new(client, config(5000));
    session.start(editor.clone());
    harness.ready.send(Ok(())).unwrap();

    let first = harness.pushes.recv().await.unwrap();
    std::thread::sleep(Duration::from_millis(2));
    editor.apply(EditorUpdate {
        uri: Some("file:///home/user/other/README".to_string()),
        root: Some("/home/user/other".to_string()),
    });

    tokio::time::advance(Duration::from_millis(5000)).await;
    let second = harness.pushes.recv().await.unwrap();

    assert_eq!(second.details(), Some("Editing README"));
    assert_eq!(second.state(), Some("On other"));
    assert_eq!(second.large_image_key(), "neovim");
    assert_eq!(second.small_image_key(), None);
    assert!(second.start_timestamp() >= first.start_timestamp());
}

#[tokio::test(start_paused = true)]
async fn never_ready_means_never_pushed() {
    let (client, mut harness) = fake_client();
    let mut session = PresenceSession::new(client, config(5000));
    session.start(project_editor());

    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(session.state(), ConnectionState::Connecting);
    assert!(harness.pushes.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn login_rejection_is_contained() {
    let (client, mut harness) = fake_client();
    let mut session = PresenceSession::new(client, config(5000));
    session.start(project_editor());

    harness
        .ready
        .send(Err(RpcError::Ipc("Invalid Client ID".to_string())))
        .unwrap();
    tokio::time::sleep(Duration::from_secs(120)).await;

    assert_eq!(session.state(), ConnectionState::Failed);
    assert!(harness.pushes.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn unanswered_push_is_abandoned_when_the_next_one_is_due() {
    let (mut client, mut harness) = fake_client();
    client.hang_pushes = 1;
    let mut session = PresenceSession::new(client, config(5000));
    session.start(project_editor());
    harness.ready.send(Ok(())).unwrap();

    harness.pushes.recv().await.unwrap();
    let hung_at = tokio::time::Instant::now();
    harness.pushes.recv().await.unwrap();

    let waited = hung_at.elapsed();
    assert!(waited >= Duration::from_millis(5000), "next push after {waited:?}");
    assert!(waited < Duration::from_millis(10_000), "next push after {waited:?}");
    assert_eq!(session.state(), ConnectionState::Ready);
}

#[tokio::test(start_paused = true)]
async fn failed_pushes_keep_the_loop_running() {
    let (mut client, mut harness) = fake_client();
    client.fail_pushes = true;
    let mut session = PresenceSession::new(client, config(5000));
    session.start(project_editor());
    harness.ready.send(Ok(())).unwrap();

    harness.pushes.recv().await.unwrap();
    tokio::time::advance(Duration::from_millis(5000)).await;
    harness.pushes.recv().await.unwrap();
    assert_eq!(session.state(), ConnectionState::Ready);
}

#[tokio::test(start_paused = true)]
async fn stop_ends_pushing_and_closes_the_client() {
    let (client, mut harness) = fake_client();
    let mut session = PresenceSession::new(client, config(5000));
    session.start(project_editor());
    harness.ready.send(Ok(())).unwrap();
    harness.pushes.recv().await.unwrap();

    session.stop().await;

    assert!(harness.cleared.load(Ordering::SeqCst));
    assert!(harness.closed.load(Ordering::SeqCst));
    // The client was dropped with the session, so no push can follow.
    assert!(harness.pushes.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn stop_does_not_wait_for_an_unanswered_push() {
    let (mut client, mut harness) = fake_client();
    client.hang_pushes = u32::MAX;
    let mut session = PresenceSession::new(client, config(5000));
    session.start(project_editor());
    harness.ready.send(Ok(())).unwrap();
    harness.pushes.recv().await.unwrap();

    tokio::time::timeout(Duration::from_secs(3), session.stop())
        .await
        .expect("stop waited on the in-flight push");

    assert!(harness.cleared.load(Ordering::SeqCst));
    assert!(harness.closed.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn stop_before_ready_does_not_wait_for_login() {
    let (client, harness) = fake_client();
    let mut session = PresenceSession::new(client, config(5000));
    session.start(project_editor());
    settle().await;

    session.stop().await;

    assert!(!harness.cleared.load(Ordering::SeqCst));
    assert!(harness.closed.load(Ordering::SeqCst));
}

#[tokio::test(start_paused = true)]
async fn dropping_the_session_keeps_the_loop_alive() {
    let (client, mut harness) = fake_client();
    let mut session = PresenceSession::new(client, config(5000));
    session.start(project_editor());
    drop(session);

    harness.ready.send(Ok(())).unwrap();
    harness.pushes.recv().await.unwrap();
    tokio::time::advance(Duration::from_millis(5000)).await;
    harness.pushes.recv().await.unwrap();
}
