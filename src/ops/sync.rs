use std::fmt;
use std::path::PathBuf;

use crate::io::cache::{CacheMiss, CacheStore};
use crate::io::remote::{FULL_SYNC_TOKEN, RemoteError, RemoteSource, ResourceKind};
use crate::model::snapshot::{CachedSnapshot, Snapshot};
use crate::ops::merge::merge;

/// Error type for the sync cycle
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("could not sync with Todoist and no cached data is available: {0}")]
    Remote(#[from] RemoteError),
}

/// A non-fatal anomaly noticed during a sync. Each one is logged when it is
/// recorded and also handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncWarning {
    SchemaMismatch { cached: String, current: String },
    CacheUnreadable { path: PathBuf, reason: String },
    CacheSaveFailed { reason: String },
    /// The remote failed and cached data was used instead
    RemoteUnavailable { reason: String },
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncWarning::SchemaMismatch { cached, current } => write!(
                f,
                "cache schema mismatch (cached: {cached}, current: {current}), performing full sync"
            ),
            SyncWarning::CacheUnreadable { path, reason } => write!(
                f,
                "failed to load cache {}, performing full sync: {reason}",
                path.display()
            ),
            SyncWarning::CacheSaveFailed { reason } => write!(f, "failed to save cache: {reason}"),
            SyncWarning::RemoteUnavailable { reason } => {
                write!(f, "sync failed, using cached data: {reason}")
            }
        }
    }
}

/// Where the returned snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    FullSync,
    Incremental,
    /// The remote was unreachable; this is the last cached snapshot
    Cache,
}

#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub snapshot: Snapshot,
    pub sync_token: String,
    pub source: DataSource,
    pub warnings: Vec<SyncWarning>,
}

fn record(warnings: &mut Vec<SyncWarning>, warning: SyncWarning) {
    tracing::warn!("{}", warning);
    warnings.push(warning);
}

/// Bring the local snapshot up to date.
///
/// Loads the cache (any problem there just means a full sync), asks the
/// remote for changes since the cached token, merges a delta or takes a full
/// response verbatim, and saves the result. If the remote fails, the cached
/// snapshot is returned with a warning; without one the sync fails.
/// A failed save is only a warning since the data is already in hand.
pub fn synchronize(
    remote: &dyn RemoteSource,
    cache: &CacheStore,
) -> Result<SyncOutcome, SyncError> {
    let mut warnings = Vec::new();

    let cached = match cache.load() {
        Ok(cached) => {
            tracing::debug!(
                entities = cached.snapshot.len(),
                cached_at = %cached.cached_at,
                schema = cache.schema(),
                "loaded cache"
            );
            Some(cached)
        }
        Err(CacheMiss::Absent) => None,
        Err(CacheMiss::SchemaMismatch { cached, current }) => {
            record(&mut warnings, SyncWarning::SchemaMismatch { cached, current });
            None
        }
        Err(CacheMiss::Unreadable { path, reason }) => {
            record(&mut warnings, SyncWarning::CacheUnreadable { path, reason });
            None
        }
    };

    let token = cached
        .as_ref()
        .map_or(FULL_SYNC_TOKEN, |c| c.sync_token.as_str());
    let response = match remote.sync(token, ResourceKind::ALL) {
        Ok(response) => response,
        Err(e) => {
            return match cached {
                Some(cached) => {
                    record(
                        &mut warnings,
                        SyncWarning::RemoteUnavailable {
                            reason: e.to_string(),
                        },
                    );
                    Ok(SyncOutcome {
                        snapshot: cached.snapshot,
                        sync_token: cached.sync_token,
                        source: DataSource::Cache,
                        warnings,
                    })
                }
                None => Err(SyncError::Remote(e)),
            };
        }
    };

    let (snapshot, source) = match cached {
        Some(cached) if !response.full_sync => {
            tracing::debug!(changed = response.entities.len(), "merging delta");
            (merge(cached.snapshot, response.entities), DataSource::Incremental)
        }
        _ => {
            tracing::debug!(entities = response.entities.len(), "full sync");
            (response.entities, DataSource::FullSync)
        }
    };

    let fresh = CachedSnapshot::new(response.sync_token, snapshot);
    if let Err(e) = cache.save(&fresh) {
        record(
            &mut warnings,
            SyncWarning::CacheSaveFailed {
                reason: e.to_string(),
            },
        );
    }

    Ok(SyncOutcome {
        snapshot: fresh.snapshot,
        sync_token: fresh.sync_token,
        source,
        warnings,
    })
}
