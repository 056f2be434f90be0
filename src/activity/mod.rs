pub mod builder;
pub mod cache;

pub use builder::{build_activity, details_for_uri, state_for_root};
pub use cache::ActivityCache;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// What the presence service shows for the user: project, file, elapsed time and icons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Activity {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    details: Option<String>,
    /// Milliseconds since the unix epoch.
    #[ts(type = "number")]
    start_timestamp: i64,
    large_image_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    small_image_key: Option<String>,
    instance: bool,
}

impl Activity {
    /// `"On <project>"`
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// `"Editing <file>"`
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn start_timestamp(&self) -> i64 {
        self.start_timestamp
    }

    pub fn large_image_key(&self) -> &str {
        &self.large_image_key
    }

    pub fn small_image_key(&self) -> Option<&str> {
        self.small_image_key.as_deref()
    }

    pub fn instance(&self) -> bool {
        self.instance
    }

    /// Whether the visible text lines match. Icons, timestamp and instance are ignored.
    pub fn same_text_as(&self, other: &Activity) -> bool {
        self.state == other.state && self.details == other.details
    }
}
