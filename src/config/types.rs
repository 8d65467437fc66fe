use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Default stale-lock window in minutes
pub fn default_lock_timeout_minutes() -> i64 {
    crate::lock::LOCK_TIMEOUT_MINUTES
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Minutes after which an abandoned verification lock may be reclaimed.
    #[serde(default = "default_lock_timeout_minutes")]
    pub lock_timeout_minutes: i64,
}

impl EngineConfig {
    /// The stale-lock window as a duration.
    #[must_use]
    pub fn lock_timeout(&self) -> Duration {
        Duration::minutes(self.lock_timeout_minutes)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lock_timeout_minutes: default_lock_timeout_minutes(),
        }
    }
}
