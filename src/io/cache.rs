use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::model::config::Config;
use crate::model::snapshot::CachedSnapshot;

pub const CACHE_FILE_NAME: &str = "todoister.bin";
pub const VERSION_FILE_NAME: &str = "version";

/// Error type for cache writes
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("could not determine the user cache directory")]
    NoCacheDir,
    #[error("could not write {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
    #[error("could not encode snapshot: {0}")]
    EncodeError(#[from] bincode::Error),
}

/// Why `load` produced no snapshot. Every variant means "do a full sync";
/// only `Absent` is unremarkable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheMiss {
    /// No cache file yet
    Absent,
    /// The cache was written by an incompatible version
    SchemaMismatch { cached: String, current: String },
    /// The file exists but could not be read or decoded
    Unreadable { path: PathBuf, reason: String },
}

impl fmt::Display for CacheMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheMiss::Absent => write!(f, "no cache file"),
            CacheMiss::SchemaMismatch { cached, current } => write!(
                f,
                "cache schema mismatch (cached: {cached}, current: {current}), will perform full sync"
            ),
            CacheMiss::Unreadable { path, reason } => write!(
                f,
                "could not load cache {}: {reason}, will perform full sync",
                path.display()
            ),
        }
    }
}

/// The compatibility tag for a version string: `major.minor`, or the whole
/// string if it has fewer than two components.
pub fn schema_tag(version: &str) -> String {
    let mut parts = version.split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => format!("{major}.{minor}"),
        _ => version.to_string(),
    }
}

/// The on-disk snapshot cache: one bincode blob plus a `schema=X.Y` marker
/// file in the same directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
    schema: String,
}

impl CacheStore {
    /// A store in `dir` for the given application version
    pub fn new(dir: impl Into<PathBuf>, app_version: &str) -> Self {
        CacheStore {
            dir: dir.into(),
            schema: schema_tag(app_version),
        }
    }

    /// The store for this build, in the configured directory or the user's
    /// cache directory.
    pub fn from_config(config: &Config) -> Result<Self, CacheError> {
        let dir = match &config.cache.dir {
            Some(dir) => dir.clone(),
            None => dirs::cache_dir()
                .ok_or(CacheError::NoCacheDir)?
                .join(crate::PROG),
        };
        Ok(Self::new(dir, env!("CARGO_PKG_VERSION")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn cache_path(&self) -> PathBuf {
        self.dir.join(CACHE_FILE_NAME)
    }

    pub fn version_path(&self) -> PathBuf {
        self.dir.join(VERSION_FILE_NAME)
    }

    /// Load the last saved snapshot.
    ///
    /// Never fails hard: any problem is reported as a [`CacheMiss`] and the
    /// caller falls back to a full sync. A schema mismatch also rewrites the
    /// marker so the next save is tagged with the current schema.
    pub fn load(&self) -> Result<CachedSnapshot, CacheMiss> {
        let version_path = self.version_path();
        if let Ok(content) = fs::read_to_string(&version_path)
            && let Some(cached) = content.trim().strip_prefix("schema=")
            && cached != self.schema
        {
            let miss = CacheMiss::SchemaMismatch {
                cached: cached.to_string(),
                current: self.schema.clone(),
            };
            if let Err(e) = fs::write(&version_path, self.marker()) {
                tracing::warn!("failed to update {}: {}", version_path.display(), e);
            }
            return Err(miss);
        }

        let cache_path = self.cache_path();
        if !cache_path.exists() {
            return Err(CacheMiss::Absent);
        }
        let bytes = fs::read(&cache_path).map_err(|e| CacheMiss::Unreadable {
            path: cache_path.clone(),
            reason: e.to_string(),
        })?;
        bincode::deserialize(&bytes).map_err(|e| CacheMiss::Unreadable {
            path: cache_path,
            reason: e.to_string(),
        })
    }

    /// Replace the cached snapshot. The blob is written atomically; the
    /// schema marker is written only if it does not exist yet.
    pub fn save(&self, cached: &CachedSnapshot) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|e| CacheError::WriteError {
            path: self.dir.clone(),
            source: e,
        })?;

        let bytes = bincode::serialize(cached)?;
        let cache_path = self.cache_path();
        atomic_write(&cache_path, &bytes).map_err(|e| CacheError::WriteError {
            path: cache_path,
            source: e,
        })?;

        let version_path = self.version_path();
        if !version_path.exists()
            && let Err(e) = fs::write(&version_path, self.marker())
        {
            tracing::warn!("failed to write {}: {}", version_path.display(), e);
        }
        Ok(())
    }

    fn marker(&self) -> String {
        format!("schema={}\n", self.schema)
    }
}

/// Write `content` to `path` atomically using a temp file + rename.
fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Comment, Due, Label, Project, Section, Snapshot, Task};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample() -> CachedSnapshot {
        let mut task = Task::new("t1", "100", "Buy milk")
            .in_section("s1")
            .with_labels(&["errand"]);
        task.description = "2%, not skim".into();
        task.priority = 3;
        task.due = Some(Due {
            is_recurring: true,
            string: "every friday".into(),
            ..Due::on("2025-03-14")
        });
        task.duration = Some(crate::model::Duration {
            amount: 15,
            unit: "minute".into(),
        });

        CachedSnapshot::new(
            "token-42",
            Snapshot {
                projects: vec![
                    Project::new("100", "Home"),
                    Project::new("200", "Garden").with_parent("100"),
                ],
                sections: vec![Section::new("s1", "100", "Shopping")],
                tasks: vec![task, Task::new("t2", "200", "Mow").completed("2025-01-01")],
                labels: vec![Label::new("l1", "errand")],
                comments: vec![
                    Comment::on_task("c1", "t1", "from the corner shop"),
                    Comment::on_project("c2", "200", "spring"),
                ],
            },
        )
    }

    #[test]
    fn save_then_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = CacheStore::new(tmp.path().join("cache"), "0.6.1");
        let cached = sample();

        store.save(&cached).unwrap();
        assert_eq!(store.load().unwrap(), cached);
        assert_eq!(
            fs::read_to_string(store.version_path()).unwrap(),
            "schema=0.6\n"
        );
    }

    #[test]
    fn missing_cache_is_absent() {
        let tmp = TempDir::new().unwrap();
        let store = CacheStore::new(tmp.path(), "0.6.0");
        assert_eq!(store.load(), Err(CacheMiss::Absent));
    }

    #[test]
    fn corrupted_cache_is_unreadable() {
        let tmp = TempDir::new().unwrap();
        let store = CacheStore::new(tmp.path(), "0.6.0");
        fs::write(store.cache_path(), b"\xff\xfe definitely not bincode").unwrap();

        match store.load() {
            Err(CacheMiss::Unreadable { path, .. }) => assert_eq!(path, store.cache_path()),
            other => panic!("expected Unreadable, got {:?}", other),
        }
    }

    #[test]
    fn schema_mismatch_rewrites_marker() {
        let tmp = TempDir::new().unwrap();
        let old = CacheStore::new(tmp.path(), "0.5.3");
        old.save(&sample()).unwrap();

        let new = CacheStore::new(tmp.path(), "0.6.0");
        assert_eq!(
            new.load(),
            Err(CacheMiss::SchemaMismatch {
                cached: "0.5".into(),
                current: "0.6".into()
            })
        );
        assert_eq!(
            fs::read_to_string(new.version_path()).unwrap(),
            "schema=0.6\n"
        );
    }

    #[test]
    fn patch_releases_share_a_schema() {
        let tmp = TempDir::new().unwrap();
        CacheStore::new(tmp.path(), "0.6.0").save(&sample()).unwrap();
        assert!(CacheStore::new(tmp.path(), "0.6.9").load().is_ok());
    }

    #[test]
    fn missing_marker_still_loads() {
        let tmp = TempDir::new().unwrap();
        let store = CacheStore::new(tmp.path(), "0.6.0");
        store.save(&sample()).unwrap();
        fs::remove_file(store.version_path()).unwrap();
        assert!(store.load().is_ok());
    }

    #[test]
    fn save_replaces_previous_blob() {
        let tmp = TempDir::new().unwrap();
        let store = CacheStore::new(tmp.path(), "0.6.0");
        store.save(&sample()).unwrap();

        let empty = CachedSnapshot::new("token-43", Snapshot::default());
        store.save(&empty).unwrap();
        assert_eq!(store.load().unwrap(), empty);
    }

    #[test]
    fn schema_tags() {
        assert_eq!(schema_tag("0.4.0"), "0.4");
        assert_eq!(schema_tag("1.12.3-rc.1"), "1.12");
        assert_eq!(schema_tag("7"), "7");
        assert_eq!(schema_tag(""), "");
    }
}
