//! Last successful usage extraction, kept on disk.

use chrono::{DateTime, Duration, Utc};
use quotabar_core::ExtractionResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::persistence::{load_json, save_json};

/// A cached extraction result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedUsage {
    /// The extraction result.
    pub result: ExtractionResult,
    /// When the page was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl CachedUsage {
    /// Wraps a result fetched now.
    pub fn new(result: ExtractionResult) -> Self {
        Self {
            result,
            fetched_at: Utc::now(),
        }
    }

    /// Age of the entry at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.fetched_at
    }

    /// Returns true if the entry is older than `max_age` at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age(now) > max_age
    }

    /// Writes the entry to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        save_json(path, self).await?;
        debug!(path = %path.display(), bars = self.result.bars.len(), "Cached usage saved");
        Ok(())
    }

    /// Reads the entry at `path`. A missing file yields `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is unreadable, malformed, or holds bars
    /// that fail validation.
    pub async fn load(path: &Path) -> Result<Option<Self>, StoreError> {
        let cached: Self = match load_json(path).await {
            Ok(cached) => cached,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read usage cache");
                return Err(e);
            }
        };

        cached.result.validate()?;
        Ok(Some(cached))
    }
}
