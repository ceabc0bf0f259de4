use crate::model::forest::{Forest, ProjectRef};
use crate::model::project::Project;
use crate::model::snapshot::Snapshot;
use crate::model::task::Task;

/// Error type for path resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("project not found: {path}")]
    NotFound { path: String },
}

fn not_found(path: &str) -> ResolveError {
    ResolveError::NotFound {
        path: path.to_string(),
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Split a user-supplied project path (`Work/Reports`) into segments.
fn segments(path: &str) -> Vec<&str> {
    path.split('/').collect()
}

// ---------------------------------------------------------------------------
// Flat-list path resolution
// ---------------------------------------------------------------------------

/// Resolve `A/B/C` to a project ID by walking a flat project list.
///
/// At each step the project must match the segment case-insensitively and
/// have the previous step's project as its parent (no parent for the first
/// segment). When siblings share a name the first one in list order wins;
/// no ambiguity is reported at this level.
pub fn resolve_project_path<'a>(
    path: &str,
    projects: &'a [Project],
) -> Result<&'a str, ResolveError> {
    if path.is_empty() {
        return Err(not_found(path));
    }

    let mut parent: Option<&str> = None;
    for segment in segments(path) {
        let found = projects
            .iter()
            .find(|p| p.parent_id.as_deref() == parent && same_name(&p.name, segment))
            .ok_or_else(|| not_found(path))?;
        parent = Some(found.id.as_str());
    }
    parent.ok_or_else(|| not_found(path))
}

// ---------------------------------------------------------------------------
// Tree path/name resolution
// ---------------------------------------------------------------------------

/// Find a project in the forest by simple name or slash path.
///
/// The first segment may match a project at any depth; each further segment
/// must match a direct child of the previous one. The search is depth-first
/// in tree order and the first complete match wins.
///
/// Returns the canonical path from the root, built from the matched
/// projects' own names (not the caller's casing), along with the node.
pub fn resolve_by_name(
    path: &str,
    forest: &Forest<'_>,
) -> Result<(String, ProjectRef), ResolveError> {
    if path.is_empty() {
        return Err(not_found(path));
    }
    let wanted = segments(path);

    let mut trail = Vec::new();
    for &root in forest.roots() {
        if let Some(found) = search(forest, root, &wanted, &mut trail) {
            return Ok(found);
        }
    }
    Err(not_found(path))
}

/// Depth-first search starting at `node`. `trail` holds the names from the
/// root down to `node`'s parent; recursion depth is bounded by tree depth.
fn search<'a>(
    forest: &Forest<'a>,
    node: ProjectRef,
    wanted: &[&str],
    trail: &mut Vec<&'a str>,
) -> Option<(String, ProjectRef)> {
    let project = forest.project(node).project;
    if same_name(&project.name, wanted[0])
        && let Some((names, found)) = descend(forest, node, &wanted[1..])
    {
        let canonical: Vec<&str> = trail.iter().copied().chain(names).collect();
        return Some((canonical.join("/"), found));
    }

    trail.push(project.name.as_str());
    let found = forest
        .project(node)
        .children
        .iter()
        .find_map(|&child| search(forest, child, wanted, trail));
    trail.pop();
    found
}

/// Follow `rest` strictly downward from `node`, trying matching children in
/// order. Returns the names walked (starting with `node`'s) and the end node.
fn descend<'a>(
    forest: &Forest<'a>,
    node: ProjectRef,
    rest: &[&str],
) -> Option<(Vec<&'a str>, ProjectRef)> {
    let name = forest.project(node).project.name.as_str();
    let Some((head, tail)) = rest.split_first() else {
        return Some((vec![name], node));
    };
    forest
        .project(node)
        .children
        .iter()
        .filter(|&&c| same_name(&forest.project(c).project.name, head))
        .find_map(|&c| descend(forest, c, tail))
        .map(|(mut names, found)| {
            names.insert(0, name);
            (names, found)
        })
}

// ---------------------------------------------------------------------------
// Task prefix matching
// ---------------------------------------------------------------------------

/// All incomplete tasks in `project_id` whose content starts with `prefix`,
/// compared case-insensitively.
///
/// Completed tasks are never returned. The caller decides what zero or
/// several matches mean.
pub fn find_tasks_by_prefix<'a>(
    project_id: &str,
    prefix: &str,
    snapshot: &'a Snapshot,
) -> Vec<&'a Task> {
    let prefix = prefix.to_lowercase();
    snapshot
        .tasks
        .iter()
        .filter(|t| t.project_id == project_id && !t.is_completed())
        .filter(|t| t.content.to_lowercase().starts_with(&prefix))
        .collect()
}
