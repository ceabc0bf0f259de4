use super::comment::{Comment, CommentTarget};
use super::label::Label;
use super::project::{Project, Section};
use super::task::Task;

// ---------------------------------------------------------------------------
// Node handles
// ---------------------------------------------------------------------------

macro_rules! node_ref {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub(crate) usize);
    };
}

node_ref!(
    /// Handle to a project node in a [`Forest`]
    ProjectRef
);
node_ref!(
    /// Handle to a section node in a [`Forest`]
    SectionRef
);
node_ref!(
    /// Handle to a task node in a [`Forest`]
    TaskRef
);
node_ref!(
    /// Handle to a shared label in a [`Forest`]
    LabelRef
);
node_ref!(
    /// Handle to a comment in a [`Forest`]
    CommentRef
);

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ProjectNode<'a> {
    pub project: &'a Project,
    pub children: Vec<ProjectRef>,
    pub sections: Vec<SectionRef>,
    /// Tasks attached directly to the project (no section)
    pub tasks: Vec<TaskRef>,
    pub comments: Vec<CommentRef>,
}

#[derive(Debug, Clone)]
pub struct SectionNode<'a> {
    pub section: &'a Section,
    pub tasks: Vec<TaskRef>,
}

#[derive(Debug, Clone)]
pub struct TaskNode<'a> {
    pub task: &'a Task,
    /// Shared, non-owning references; one label may appear on many tasks
    pub labels: Vec<LabelRef>,
    pub comments: Vec<CommentRef>,
}

/// An entity the hierarchy builder left out of the tree because one of its
/// references does not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dangling {
    /// The project's parent ID names no known project; its subtree is dropped
    ProjectParent { project_id: String, parent_id: String },
    /// The project never reaches a root (it sits in a parent cycle, or below
    /// a project that was dropped)
    UnreachableProject { project_id: String },
    SectionProject { section_id: String, project_id: String },
    TaskProject { task_id: String, project_id: String },
    /// The section is unknown or belongs to a different project than the task
    TaskSection { task_id: String, section_id: String },
    TaskLabel { task_id: String, label: String },
    CommentTarget { comment_id: String, target: CommentTarget },
}

impl std::fmt::Display for Dangling {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dangling::ProjectParent {
                project_id,
                parent_id,
            } => write!(f, "project {project_id}: unknown parent {parent_id}"),
            Dangling::UnreachableProject { project_id } => {
                write!(f, "project {project_id}: not reachable from any root")
            }
            Dangling::SectionProject {
                section_id,
                project_id,
            } => write!(f, "section {section_id}: unknown project {project_id}"),
            Dangling::TaskProject {
                task_id,
                project_id,
            } => write!(f, "task {task_id}: unknown project {project_id}"),
            Dangling::TaskSection {
                task_id,
                section_id,
            } => write!(f, "task {task_id}: section {section_id} not in task's project"),
            Dangling::TaskLabel { task_id, label } => {
                write!(f, "task {task_id}: unknown label {label}")
            }
            Dangling::CommentTarget { comment_id, target } => match target {
                CommentTarget::Task(id) => write!(f, "comment {comment_id}: unknown task {id}"),
                CommentTarget::Project(id) => {
                    write!(f, "comment {comment_id}: unknown project {id}")
                }
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Forest
// ---------------------------------------------------------------------------

/// The navigable projection of a snapshot: an arena of nodes addressed by
/// typed handles, plus the list of root projects.
///
/// A forest borrows from the snapshot it was built from and never modifies
/// it. It is rebuilt for every command and never persisted.
#[derive(Debug, Clone, Default)]
pub struct Forest<'a> {
    pub(crate) projects: Vec<ProjectNode<'a>>,
    pub(crate) sections: Vec<SectionNode<'a>>,
    pub(crate) tasks: Vec<TaskNode<'a>>,
    pub(crate) labels: Vec<&'a Label>,
    pub(crate) comments: Vec<&'a Comment>,
    pub(crate) roots: Vec<ProjectRef>,
    pub(crate) dangling: Vec<Dangling>,
}

impl<'a> Forest<'a> {
    pub fn roots(&self) -> &[ProjectRef] {
        &self.roots
    }

    pub fn project(&self, r: ProjectRef) -> &ProjectNode<'a> {
        &self.projects[r.0]
    }

    pub fn section(&self, r: SectionRef) -> &SectionNode<'a> {
        &self.sections[r.0]
    }

    pub fn task(&self, r: TaskRef) -> &TaskNode<'a> {
        &self.tasks[r.0]
    }

    pub fn label(&self, r: LabelRef) -> &'a Label {
        self.labels[r.0]
    }

    pub fn comment(&self, r: CommentRef) -> &'a Comment {
        self.comments[r.0]
    }

    /// Entities omitted from the tree, in the order they were encountered
    pub fn dangling(&self) -> &[Dangling] {
        &self.dangling
    }

    /// Depth-first pre-order walk over every reachable project, yielding
    /// `(depth, project)` with roots at depth 0.
    pub fn walk(&self) -> Vec<(usize, ProjectRef)> {
        self.walk_from(&self.roots)
    }

    /// Pre-order walk of the subtree rooted at `start` (`start` at depth 0).
    pub fn walk_subtree(&self, start: ProjectRef) -> Vec<(usize, ProjectRef)> {
        self.walk_from(&[start])
    }

    fn walk_from(&self, starts: &[ProjectRef]) -> Vec<(usize, ProjectRef)> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, ProjectRef)> =
            starts.iter().rev().map(|&r| (0, r)).collect();
        while let Some((depth, r)) = stack.pop() {
            out.push((depth, r));
            for &child in self.projects[r.0].children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }
}
