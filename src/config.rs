use std::time::Duration;

/// Push interval used when none is configured.
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 10_000;

/// Settings for a presence session: which application to log in as, and how
/// often the current activity is re-sent once the session is ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterConfig {
    client_id: String,
    update_interval: Duration,
}

impl ReporterConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            update_interval: Duration::from_millis(DEFAULT_UPDATE_INTERVAL_MS),
        }
    }

    /// Overrides the push interval. `None` and `Some(0)` keep the default,
    /// since a zero period would spin the push loop.
    pub fn with_update_interval_ms(mut self, interval_ms: Option<u64>) -> Self {
        let interval_ms = interval_ms
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_UPDATE_INTERVAL_MS);
        self.update_interval = Duration::from_millis(interval_ms);
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }
}
