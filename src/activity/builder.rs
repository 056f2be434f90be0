use chrono::Utc;

use super::Activity;
use crate::assets::{self, HOST_IMAGE_KEY};
use crate::editor::EditorState;

const FILE_SCHEME_PREFIX: &str = "file:///";

/// `"Editing <file name>"` for a local-file identifier, `None` for anything else
/// (no buffer, `untitled:` scratch buffers, remote schemes).
///
/// Empty segments are skipped, so a trailing `/` names the last directory instead
/// of producing `"Editing "`.
pub fn details_for_uri(uri: Option<&str>) -> Option<String> {
    uri.and_then(|uri| uri.strip_prefix(FILE_SCHEME_PREFIX))
        .and_then(|path| last_segment(path, &['/']))
        .map(|file_name| format!("Editing {file_name}"))
}

/// `"On <folder name>"` for a project root, `None` without one.
///
/// Splits on both `/` and `\`; a trailing separator is ignored rather than yielding `"On "`.
pub fn state_for_root(root: Option<&str>) -> Option<String> {
    root.and_then(|root| last_segment(root, &['/', '\\']))
        .map(|folder| format!("On {folder}"))
}

fn last_segment<'a>(path: &'a str, separators: &[char]) -> Option<&'a str> {
    path.split(separators).filter(|segment| !segment.is_empty()).last()
}

/// Computes a fresh snapshot from the editor's current facts, stamped with the current time.
pub fn build_activity<E>(editor: &E) -> Activity
where
    E: EditorState + ?Sized,
{
    let details = details_for_uri(editor.current_uri().as_deref());
    let state = state_for_root(editor.project_root().as_deref());

    let (large_image_key, small_image_key) = match assets::file_type_icon(details.as_deref()) {
        Some(icon) => (icon.to_string(), Some(HOST_IMAGE_KEY.to_string())),
        None => (HOST_IMAGE_KEY.to_string(), None),
    };

    Activity {
        state,
        details,
        start_timestamp: Utc::now().timestamp_millis(),
        large_image_key,
        small_image_key,
        instance: false,
    }
}
