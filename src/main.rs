use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use editor_presence::{
    config::ReporterConfig,
    editor::{SharedEditorState, feed_updates},
    rpc::IpcClient,
    session::PresenceSession,
};
use tokio::{io::BufReader, signal::ctrl_c};

// The host editor spawns this process and writes one JSON line per change:
//   {"uri":"file:///home/user/project/main.rs","root":"/home/user/project"}
// Closing stdin (editor exit) shuts the reporter down.

/// Reports the editor's current file and project to the local presence service.
#[derive(Debug, Parser)]
#[command(name = "editor-presence", version)]
struct Cli {
    /// Application (client) id to log in to the presence service with.
    #[arg(long, env = "EDITOR_PRESENCE_CLIENT_ID", value_parser = NonEmptyStringValueParser::new())]
    client_id: String,

    /// How often to re-send the current activity, in milliseconds.
    #[arg(long, env = "EDITOR_PRESENCE_INTERVAL_MS")]
    interval_ms: Option<u64>,

    #[arg(long, default_value = "info")]
    log_level: tracing::Level,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // stdout belongs to the host editor
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = ReporterConfig::new(cli.client_id).with_update_interval_ms(cli.interval_ms);
    let editor = SharedEditorState::default();

    let mut session = PresenceSession::new(IpcClient::new(), config);
    session.start(editor.clone());

    let interrupted = async {
        if let Err(e) = ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let stdin = BufReader::new(tokio::io::stdin());
    tokio::select! {
        result = feed_updates(stdin, editor) => match result {
            Ok(applied) => tracing::info!(applied, "Editor closed the update feed"),
            Err(e) => tracing::error!("Failed to read editor updates: {}", e),
        },
        _ = interrupted => tracing::info!("Ctrl+C received, shutting down"),
    }

    session.stop().await;
    Ok(())
}
