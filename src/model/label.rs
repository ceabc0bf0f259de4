use serde::{Deserialize, Serialize};

/// A personal label. Tasks refer to labels by name, not by ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
}

impl Label {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Label {
            id: id.into(),
            name: name.into(),
            color: String::new(),
        }
    }
}
