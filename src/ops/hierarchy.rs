use std::collections::{HashMap, HashSet, VecDeque};

use crate::model::comment::CommentTarget;
use crate::model::forest::*;
use crate::model::snapshot::Snapshot;

/// Project a flat snapshot into a forest of projects.
///
/// One pass per entity kind against ID-indexed maps. Anything whose parent
/// or foreign key does not resolve is left out of the tree and recorded in
/// [`Forest::dangling`]; nothing here is fatal. Child lists keep the order
/// of the source lists.
pub fn build_forest(snapshot: &Snapshot) -> Forest<'_> {
    let mut forest = Forest::default();

    // 1. One node per project
    let mut project_index: HashMap<&str, ProjectRef> = HashMap::new();
    for project in &snapshot.projects {
        let r = ProjectRef(forest.projects.len());
        forest.projects.push(ProjectNode {
            project,
            children: Vec::new(),
            sections: Vec::new(),
            tasks: Vec::new(),
            comments: Vec::new(),
        });
        project_index.insert(project.id.as_str(), r);
    }

    // 2. Link projects to parents (or the root list)
    for (i, project) in snapshot.projects.iter().enumerate() {
        let r = ProjectRef(i);
        match project.parent_id.as_deref() {
            None => forest.roots.push(r),
            Some(parent_id) => match project_index.get(parent_id) {
                Some(&parent) if parent != r => forest.projects[parent.0].children.push(r),
                _ => forest.dangling.push(Dangling::ProjectParent {
                    project_id: project.id.clone(),
                    parent_id: parent_id.to_string(),
                }),
            },
        }
    }
    let reachable = reachable_projects(&forest);
    let heads: HashSet<String> = forest
        .dangling
        .iter()
        .filter_map(|d| match d {
            Dangling::ProjectParent { project_id, .. } => Some(project_id.clone()),
            _ => None,
        })
        .collect();
    for (i, project) in snapshot.projects.iter().enumerate() {
        if !reachable[i] && !heads.contains(&project.id) {
            forest.dangling.push(Dangling::UnreachableProject {
                project_id: project.id.clone(),
            });
        }
    }

    // 3. Sections
    let mut section_index: HashMap<&str, SectionRef> = HashMap::new();
    for section in &snapshot.sections {
        let Some(&owner) = project_index.get(section.project_id.as_str()) else {
            forest.dangling.push(Dangling::SectionProject {
                section_id: section.id.clone(),
                project_id: section.project_id.clone(),
            });
            continue;
        };
        let r = SectionRef(forest.sections.len());
        forest.sections.push(SectionNode {
            section,
            tasks: Vec::new(),
        });
        forest.projects[owner.0].sections.push(r);
        section_index.insert(section.id.as_str(), r);
    }

    // Labels are joined by name; the first label wins on a duplicate name
    let mut label_index: HashMap<&str, LabelRef> = HashMap::new();
    for label in &snapshot.labels {
        label_index
            .entry(label.name.as_str())
            .or_insert(LabelRef(forest.labels.len()));
        forest.labels.push(label);
    }

    // 4 + 5. Tasks and their label references
    let mut task_index: HashMap<&str, TaskRef> = HashMap::new();
    for task in &snapshot.tasks {
        let Some(&owner) = project_index.get(task.project_id.as_str()) else {
            forest.dangling.push(Dangling::TaskProject {
                task_id: task.id.clone(),
                project_id: task.project_id.clone(),
            });
            continue;
        };
        let section = match task.section_id.as_deref() {
            None => None,
            Some(section_id) => match section_index.get(section_id) {
                Some(&s) if forest.sections[s.0].section.project_id == task.project_id => Some(s),
                _ => {
                    forest.dangling.push(Dangling::TaskSection {
                        task_id: task.id.clone(),
                        section_id: section_id.to_string(),
                    });
                    continue;
                }
            },
        };

        let mut labels = Vec::new();
        for name in task.labels.iter().filter(|n| !n.is_empty()) {
            match label_index.get(name.as_str()) {
                Some(&l) => labels.push(l),
                None => forest.dangling.push(Dangling::TaskLabel {
                    task_id: task.id.clone(),
                    label: name.clone(),
                }),
            }
        }

        let r = TaskRef(forest.tasks.len());
        forest.tasks.push(TaskNode {
            task,
            labels,
            comments: Vec::new(),
        });
        match section {
            Some(s) => forest.sections[s.0].tasks.push(r),
            None => forest.projects[owner.0].tasks.push(r),
        }
        task_index.insert(task.id.as_str(), r);
    }

    // 6. Comments
    for comment in &snapshot.comments {
        let r = CommentRef(forest.comments.len());
        let attached = match &comment.target {
            CommentTarget::Task(id) => match task_index.get(id.as_str()) {
                Some(t) => {
                    forest.tasks[t.0].comments.push(r);
                    true
                }
                None => false,
            },
            CommentTarget::Project(id) => match project_index.get(id.as_str()) {
                Some(p) => {
                    forest.projects[p.0].comments.push(r);
                    true
                }
                None => false,
            },
        };
        if attached {
            forest.comments.push(comment);
        } else {
            forest.dangling.push(Dangling::CommentTarget {
                comment_id: comment.id.clone(),
                target: comment.target.clone(),
            });
        }
    }

    for d in &forest.dangling {
        tracing::debug!("left out of hierarchy: {}", d);
    }

    forest
}

/// Breadth-first from the roots. Each project has at most one parent, so a
/// project is visited at most once and a parent cycle is simply never entered.
fn reachable_projects(forest: &Forest<'_>) -> Vec<bool> {
    let mut seen = vec![false; forest.projects.len()];
    let mut queue: VecDeque<ProjectRef> = forest.roots.iter().copied().collect();
    while let Some(r) = queue.pop_front() {
        if seen[r.0] {
            continue;
        }
        seen[r.0] = true;
        queue.extend(forest.projects[r.0].children.iter().copied());
    }
    seen
}
