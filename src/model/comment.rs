use serde::{Deserialize, Serialize};

/// What a comment is attached to. A comment belongs to exactly one task or
/// exactly one project, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommentTarget {
    Task(String),
    Project(String),
}

/// A comment (the remote source calls these "notes")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub target: CommentTarget,
}

impl Comment {
    pub fn on_task(
        id: impl Into<String>,
        task_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Comment {
            id: id.into(),
            content: content.into(),
            target: CommentTarget::Task(task_id.into()),
        }
    }

    pub fn on_project(
        id: impl Into<String>,
        project_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Comment {
            id: id.into(),
            content: content.into(),
            target: CommentTarget::Project(project_id.into()),
        }
    }
}
