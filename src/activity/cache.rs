use tracing::{debug, trace};

use super::{Activity, build_activity};
use crate::editor::EditorState;

/// Holds the one current [`Activity`] and decides when a recomputed snapshot replaces it.
///
/// Every read recomputes a candidate from the editor. The candidate only wins when its
/// `state` or `details` text differs from the cached snapshot, so the start timestamp
/// (and with it the elapsed time shown remotely) survives polls where nothing visible changed.
#[derive(Debug)]
pub struct ActivityCache<E> {
    editor: E,
    current: Option<Activity>,
}

impl<E: EditorState> ActivityCache<E> {
    pub fn new(editor: E) -> Self {
        Self {
            editor,
            current: None,
        }
    }

    /// Returns the current snapshot, replacing it first if the editor's visible state changed.
    pub fn current(&mut self) -> &Activity {
        let candidate = build_activity(&self.editor);

        let next = match self.current.take() {
            Some(cached) if cached.same_text_as(&candidate) => {
                trace!("Editor activity unchanged, keeping cached snapshot");
                cached
            }
            previous => {
                debug!(
                    state = ?candidate.state(),
                    details = ?candidate.details(),
                    replaced = previous.is_some(),
                    "Editor activity changed"
                );
                candidate
            }
        };

        self.current.insert(next)
    }

    /// The cached snapshot without recomputing, `None` before the first read.
    pub fn peek(&self) -> Option<&Activity> {
        self.current.as_ref()
    }
}
