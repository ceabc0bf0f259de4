pub mod comment;
pub mod config;
pub mod forest;
pub mod label;
pub mod project;
pub mod snapshot;
pub mod task;

pub use comment::*;
pub use config::*;
pub use forest::*;
pub use label::*;
pub use project::*;
pub use snapshot::*;
pub use task::*;

use serde::{Deserialize, Deserializer};

/// Deserialize an optional ID, treating `""` the same as absent.
///
/// The remote source sends root projects with `parent_id: ""` in older
/// payloads and `null` in newer ones.
pub(crate) fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}
