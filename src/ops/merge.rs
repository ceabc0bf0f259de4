use indexmap::IndexMap;

use crate::model::snapshot::{Delta, Identified, Snapshot};

/// Combine a previous snapshot with an incremental delta.
///
/// ID is the only identity key: an incoming entity replaces the stored one
/// with the same ID wholesale, and entities the delta does not mention are
/// kept as they were. A delta never removes anything; deletions on the
/// remote side only show up after a full resync.
///
/// Existing entities keep their position; new ones are appended in delta
/// order.
pub fn merge(previous: Snapshot, delta: Delta) -> Snapshot {
    Snapshot {
        projects: upsert_all(previous.projects, delta.projects),
        sections: upsert_all(previous.sections, delta.sections),
        tasks: upsert_all(previous.tasks, delta.tasks),
        labels: upsert_all(previous.labels, delta.labels),
        comments: upsert_all(previous.comments, delta.comments),
    }
}

fn upsert_all<T: Identified>(previous: Vec<T>, incoming: Vec<T>) -> Vec<T> {
    let mut by_id: IndexMap<String, T> = IndexMap::with_capacity(previous.len() + incoming.len());
    for entity in previous.into_iter().chain(incoming) {
        by_id.insert(entity.id().to_string(), entity);
    }
    by_id.into_values().collect()
}
