use serde::{Deserialize, Serialize};

use super::empty_as_none;

/// A project as stored in the flat snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub view_style: String,
    /// Parent project ID (`None` for root projects)
    #[serde(default, deserialize_with = "empty_as_none")]
    pub parent_id: Option<String>,
}

impl Project {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Project {
            id: id.into(),
            name: name.into(),
            color: String::new(),
            view_style: String::new(),
            parent_id: None,
        }
    }

    /// Builder-style helper to set the parent project
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// A section within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub project_id: String,
    pub name: String,
    #[serde(default, alias = "is_collapsed")]
    pub collapsed: bool,
    #[serde(default, alias = "section_order")]
    pub order: i32,
}

impl Section {
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Section {
            id: id.into(),
            project_id: project_id.into(),
            name: name.into(),
            collapsed: false,
            order: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parent_id_accepts_empty_null_and_missing() {
        let empty: Project =
            serde_json::from_str(r#"{"id":"1","name":"Inbox","parent_id":""}"#).unwrap();
        let null: Project =
            serde_json::from_str(r#"{"id":"1","name":"Inbox","parent_id":null}"#).unwrap();
        let missing: Project = serde_json::from_str(r#"{"id":"1","name":"Inbox"}"#).unwrap();
        assert!(empty.is_root());
        assert!(null.is_root());
        assert!(missing.is_root());
    }

    #[test]
    fn section_field_aliases() {
        let s: Section = serde_json::from_str(
            r#"{"id":"7","project_id":"200","name":"Q1","section_order":3}"#,
        )
        .unwrap();
        assert_eq!(s.project_id, "200");
        assert_eq!(s.order, 3);
        assert!(!s.collapsed);
    }
}
