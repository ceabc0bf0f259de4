use serde::{Deserialize, Serialize};

use crate::model::comment::Comment;
use crate::model::config::Config;
use crate::model::label::Label;
use crate::model::project::{Project, Section};
use crate::model::snapshot::Snapshot;
use crate::model::task::{DueInput, Task};

/// Sync token that requests a full sync
pub const FULL_SYNC_TOKEN: &str = "*";

/// Error type for remote calls
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("no API token configured (set `token` in config.toml, TODOIST_TOKEN, or --token)")]
    MissingToken,
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        source: std::io::Error,
    },
}

/// Resource kinds the sync endpoint can return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Projects,
    Sections,
    Items,
    Labels,
    Notes,
    ProjectNotes,
}

impl ResourceKind {
    pub const ALL: &'static [ResourceKind] = &[
        ResourceKind::Projects,
        ResourceKind::Sections,
        ResourceKind::Items,
        ResourceKind::Labels,
        ResourceKind::Notes,
        ResourceKind::ProjectNotes,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Projects => "projects",
            ResourceKind::Sections => "sections",
            ResourceKind::Items => "items",
            ResourceKind::Labels => "labels",
            ResourceKind::Notes => "notes",
            ResourceKind::ProjectNotes => "project_notes",
        }
    }
}

/// One round-trip of the sync protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResponse {
    /// `true` when `entities` is the whole dataset rather than a delta
    pub full_sync: bool,
    /// Token to send on the next incremental sync
    pub sync_token: String,
    pub entities: Snapshot,
}

/// Where snapshots come from.
pub trait RemoteSource {
    /// Fetch everything changed since `sync_token` (`*` for everything).
    fn sync(&self, sync_token: &str, kinds: &[ResourceKind]) -> Result<SyncResponse, RemoteError>;

    /// Read-only listing of all projects, without touching the cache.
    fn list_projects(&self) -> Result<Vec<Project>, RemoteError>;
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct WireSync {
    #[serde(default)]
    full_sync: bool,
    sync_token: String,
    #[serde(default, deserialize_with = "prefer_v2_ids")]
    projects: Vec<Project>,
    #[serde(default, deserialize_with = "prefer_v2_ids")]
    sections: Vec<Section>,
    #[serde(default, deserialize_with = "prefer_v2_ids")]
    items: Vec<Task>,
    #[serde(default, deserialize_with = "prefer_v2_ids")]
    labels: Vec<Label>,
    #[serde(default, deserialize_with = "prefer_v2_ids")]
    notes: Vec<WireNote>,
    #[serde(default, deserialize_with = "prefer_v2_ids")]
    project_notes: Vec<WireProjectNote>,
}

/// ID-bearing keys that may also arrive with a `v2_` prefix
const V2_KEYS: [&str; 5] = ["id", "parent_id", "project_id", "section_id", "item_id"];

/// Sync payloads can carry both the legacy key (`id`) and its `v2_id`
/// counterpart on the same object. The `v2_` value replaces the legacy one
/// before the entity is decoded.
fn prefer_v2_ids<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let raw = Vec::<serde_json::Map<String, serde_json::Value>>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|mut object| {
            for key in V2_KEYS {
                if let Some(value) = object.remove(&format!("v2_{key}")) {
                    object.insert(key.to_string(), value);
                }
            }
            serde_json::from_value(serde_json::Value::Object(object))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct WireNote {
    id: String,
    item_id: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct WireProjectNote {
    id: String,
    project_id: String,
    #[serde(default)]
    content: String,
}

impl From<WireSync> for SyncResponse {
    fn from(wire: WireSync) -> Self {
        let mut comments: Vec<Comment> = wire
            .notes
            .into_iter()
            .map(|n| Comment::on_task(n.id, n.item_id, n.content))
            .collect();
        comments.extend(
            wire.project_notes
                .into_iter()
                .map(|n| Comment::on_project(n.id, n.project_id, n.content)),
        );
        SyncResponse {
            full_sync: wire.full_sync,
            sync_token: wire.sync_token,
            entities: Snapshot {
                projects: wire.projects,
                sections: wire.sections,
                tasks: wire.items,
                labels: wire.labels,
                comments,
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    results: Vec<T>,
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProjectCreateRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct TaskCreateRequest<'a> {
    content: &'a str,
    project_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_string: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_lang: Option<&'a str>,
}

impl<'a> TaskCreateRequest<'a> {
    fn new(content: &'a str, project_id: &'a str, due: Option<&'a DueInput>) -> Self {
        let mut request = TaskCreateRequest {
            content,
            project_id,
            due_date: None,
            due_datetime: None,
            due_string: None,
            due_lang: None,
        };
        match due {
            Some(DueInput::Date(date)) => {
                request.due_date = Some(date.format("%Y-%m-%d").to_string());
            }
            Some(DueInput::DateTime(datetime)) => {
                request.due_datetime = Some(datetime.format("%Y-%m-%dT%H:%M:%S").to_string());
            }
            Some(DueInput::Natural { string, lang }) => {
                request.due_string = Some(string.as_str());
                request.due_lang = Some(lang.as_str());
            }
            None => {}
        }
        request
    }
}

// ---------------------------------------------------------------------------
// HTTP client
// ---------------------------------------------------------------------------

/// Blocking client for the Todoist API
pub struct HttpRemote {
    agent: ureq::Agent,
    base_url: String,
    token: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        HttpRemote {
            agent: ureq::AgentBuilder::new().build(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, RemoteError> {
        let token = config.token().ok_or(RemoteError::MissingToken)?;
        Ok(Self::new(&config.api.base_url, token))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Create a project, optionally below `parent_id`
    pub fn create_project(
        &self,
        name: &str,
        parent_id: Option<&str>,
        color: Option<&str>,
    ) -> Result<Project, RemoteError> {
        let url = self.url("projects");
        tracing::debug!(%url, name, "creating project");
        let result = self
            .agent
            .post(&url)
            .set("Authorization", &self.auth())
            .send_json(ProjectCreateRequest {
                name,
                parent_id,
                color,
            });
        decode(&url, result)
    }

    /// Create a task at the top level of a project
    pub fn create_task(
        &self,
        content: &str,
        project_id: &str,
        due: Option<&DueInput>,
    ) -> Result<Task, RemoteError> {
        let url = self.url("tasks");
        tracing::debug!(%url, project_id, "creating task");
        let result = self
            .agent
            .post(&url)
            .set("Authorization", &self.auth())
            .send_json(TaskCreateRequest::new(content, project_id, due));
        decode(&url, result)
    }

    /// Mark a task completed
    pub fn close_task(&self, task_id: &str) -> Result<(), RemoteError> {
        let url = self.url(&format!("tasks/{task_id}/close"));
        tracing::debug!(%url, "closing task");
        let result = self.agent.post(&url).set("Authorization", &self.auth()).call();
        check(&url, result).map(|_| ())
    }

    /// Delete a project together with its subprojects and tasks
    pub fn delete_project(&self, project_id: &str) -> Result<(), RemoteError> {
        let url = self.url(&format!("projects/{project_id}"));
        tracing::debug!(%url, "deleting project");
        let result = self
            .agent
            .delete(&url)
            .set("Authorization", &self.auth())
            .call();
        check(&url, result).map(|_| ())
    }
}

impl RemoteSource for HttpRemote {
    fn sync(&self, sync_token: &str, kinds: &[ResourceKind]) -> Result<SyncResponse, RemoteError> {
        let url = self.url("sync");
        let kinds: Vec<&str> = kinds.iter().map(|k| k.as_str()).collect();
        let resource_types = serde_json::Value::from(kinds).to_string();
        tracing::debug!(%url, sync_token, %resource_types, "sync");

        let result = self
            .agent
            .post(&url)
            .set("Authorization", &self.auth())
            .send_form(&[
                ("sync_token", sync_token),
                ("resource_types", resource_types.as_str()),
            ]);
        let wire: WireSync = decode(&url, result)?;
        Ok(wire.into())
    }

    fn list_projects(&self) -> Result<Vec<Project>, RemoteError> {
        let url = self.url("projects");
        let mut projects = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let mut request = self
                .agent
                .get(&url)
                .set("Authorization", &self.auth())
                .query("limit", "200");
            if let Some(c) = &cursor {
                request = request.query("cursor", c);
            }
            let page: Page<Project> = decode(&url, request.call())?;
            projects.extend(page.results);
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => break,
            }
        }
        tracing::debug!(count = projects.len(), "listed projects");
        Ok(projects)
    }
}

fn check(
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<ureq::Response, RemoteError> {
    match result {
        Ok(response) => Ok(response),
        Err(ureq::Error::Status(status, response)) => Err(RemoteError::Status {
            url: url.to_string(),
            status,
            body: response.into_string().unwrap_or_default(),
        }),
        Err(ureq::Error::Transport(t)) => Err(RemoteError::Transport {
            url: url.to_string(),
            message: t.to_string(),
        }),
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    url: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<T, RemoteError> {
    check(url, result)?
        .into_json()
        .map_err(|e| RemoteError::Decode {
            url: url.to_string(),
            source: e,
        })
}
