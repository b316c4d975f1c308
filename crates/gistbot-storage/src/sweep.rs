//! Expired-ephemeral sweep primitive.
//!
//! Computes the retention cutoff from configuration and purges ephemeral
//! gists older than it. Scheduling (when and how often to call this) is the
//! caller's job; `StorageConfig::sweep_interval_secs` is advisory input for
//! that external scheduler.

use chrono::Utc;
use tracing::{info, warn};

use gistbot_core::config::StorageConfig;
use gistbot_core::error::GistbotError;

use crate::repository::GistRepository;

/// Result of a sweep cycle.
#[derive(Debug, Clone)]
pub struct SweepResult {
    /// Number of ephemeral gists deleted.
    pub records_deleted: usize,
    /// The cutoff used: gists submitted before this unix time were purged.
    pub cutoff_unix_time: i64,
}

/// Runs sweep cycles against a gist repository.
pub struct Sweeper;

impl Sweeper {
    /// Run one sweep cycle: delete ephemeral gists older than the configured
    /// retention threshold.
    ///
    /// Returns `Ok(None)` without touching the database when
    /// `retention_secs` is unset. There is no built-in retention default;
    /// sweeping is opt-in.
    pub fn run_sweep(
        repo: &GistRepository,
        config: &StorageConfig,
    ) -> Result<Option<SweepResult>, GistbotError> {
        let Some(retention_secs) = config.retention_secs else {
            warn!("Sweep requested but retention_secs is not configured; skipping");
            return Ok(None);
        };

        let cutoff_unix_time = Utc::now().timestamp() - retention_secs as i64;
        let records_deleted = repo.purge_expired(cutoff_unix_time)?;

        info!(
            records_deleted = records_deleted,
            cutoff_unix_time = cutoff_unix_time,
            "Sweep cycle complete"
        );

        Ok(Some(SweepResult {
            records_deleted,
            cutoff_unix_time,
        }))
    }
}
