use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, trace, warn};
use ts_rs::TS;

/// Facts about the host editor that activity snapshots are derived from.
///
/// Both are optional: an editor with no buffer open, or opened outside any
/// project, simply reports nothing.
pub trait EditorState: Send + Sync {
    /// Identifier of the resource in the focused buffer (`file:///...`, `untitled:...`).
    fn current_uri(&self) -> Option<String>;

    /// Root folder of the current workspace.
    fn project_root(&self) -> Option<String>;
}

/// One line of the host editor's update feed. Each update replaces both facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EditorUpdate {
    #[serde(default)]
    #[ts(optional)]
    pub uri: Option<String>,
    #[serde(default)]
    #[ts(optional)]
    pub root: Option<String>,
}

impl EditorState for EditorUpdate {
    fn current_uri(&self) -> Option<String> {
        self.uri.clone()
    }

    fn project_root(&self) -> Option<String> {
        self.root.clone()
    }
}

/// Editor state shared between the update feed (writer) and the push loop (reader).
#[derive(Debug, Clone, Default)]
pub struct SharedEditorState {
    inner: Arc<RwLock<EditorUpdate>>,
}

impl SharedEditorState {
    pub fn new(initial: EditorUpdate) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn apply(&self, update: EditorUpdate) {
        // A poisoned lock only means a reader panicked mid-clone; the data is still whole.
        let mut guard = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = update;
    }

    pub fn snapshot(&self) -> EditorUpdate {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl EditorState for SharedEditorState {
    fn current_uri(&self) -> Option<String> {
        self.snapshot().uri
    }

    fn project_root(&self) -> Option<String> {
        self.snapshot().root
    }
}

/// Reads newline-delimited JSON [`EditorUpdate`]s and applies each to `editor`
/// until the reader hits EOF. Malformed lines are skipped.
///
/// Returns the number of updates applied.
pub async fn feed_updates<R>(reader: R, editor: SharedEditorState) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut applied = 0;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<EditorUpdate>(line) {
            Ok(update) => {
                trace!(?update, "Applying editor update");
                editor.apply(update);
                applied += 1;
            }
            Err(e) => {
                warn!("Skipping malformed editor update: {}. Raw: '{}'", e, line);
            }
        }
    }

    debug!(applied, "Editor update feed reached EOF");
    Ok(applied)
}
