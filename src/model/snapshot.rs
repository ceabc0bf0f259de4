use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::comment::Comment;
use super::label::Label;
use super::project::{Project, Section};
use super::task::Task;

/// The complete flat set of entities known locally.
///
/// Within each list IDs are unique. List order carries no meaning beyond
/// being stable for a given snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub sections: Vec<Section>,
    pub tasks: Vec<Task>,
    pub labels: Vec<Label>,
    pub comments: Vec<Comment>,
}

/// A partial snapshot returned by an incremental sync: only the entities that
/// were added or changed since the previous sync token.
pub type Delta = Snapshot;

impl Snapshot {
    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
            && self.sections.is_empty()
            && self.tasks.is_empty()
            && self.labels.is_empty()
            && self.comments.is_empty()
    }

    /// Total number of entities across all kinds
    pub fn len(&self) -> usize {
        self.projects.len()
            + self.sections.len()
            + self.tasks.len()
            + self.labels.len()
            + self.comments.len()
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }
}

/// Anything carrying a stable ID that is unique within its kind.
pub trait Identified {
    fn id(&self) -> &str;
}

macro_rules! impl_identified {
    ($($ty:ty),*) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_identified!(Project, Section, Task, Label, Comment);

/// What the cache store persists: a snapshot, the sync token it corresponds
/// to, and when it was captured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSnapshot {
    pub sync_token: String,
    pub cached_at: DateTime<Utc>,
    pub snapshot: Snapshot,
}

impl CachedSnapshot {
    pub fn new(sync_token: impl Into<String>, snapshot: Snapshot) -> Self {
        CachedSnapshot {
            sync_token: sync_token.into(),
            cached_at: Utc::now(),
            snapshot,
        }
    }
}
