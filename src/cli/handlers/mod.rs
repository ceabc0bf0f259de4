mod write;
pub use write::{cmd_add, cmd_check, cmd_delete};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::cache::CacheStore;
use crate::io::remote::HttpRemote;
use crate::model::config::Config;
use crate::model::snapshot::Snapshot;
use crate::ops::hierarchy::build_forest;
use crate::ops::resolve::resolve_by_name;
use crate::ops::sync::{self, DataSource};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    match cli.command {
        // Read commands
        Commands::List(args) => cmd_list(args, config, json),
        Commands::Tasks(args) => cmd_tasks(args, config, json),

        // Write commands
        Commands::Add(args) => cmd_add(args, config, json),
        Commands::Check(args) => cmd_check(args, config),
        Commands::Delete(args) => cmd_delete(args, config),

        Commands::Version => {
            cmd_version();
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot loading
// ---------------------------------------------------------------------------

/// Sync with Todoist (or fall back to the cache) and return the snapshot.
/// Warnings have already been logged by the sync layer.
pub(crate) fn load_snapshot(config: &Config) -> Result<Snapshot, Box<dyn std::error::Error>> {
    let remote = HttpRemote::from_config(config)?;
    let cache = CacheStore::from_config(config)?;
    let outcome = sync::synchronize(&remote, &cache)?;
    match outcome.source {
        DataSource::FullSync => tracing::debug!("full sync complete"),
        DataSource::Incremental => tracing::debug!("incremental sync complete"),
        DataSource::Cache => tracing::debug!("serving cached snapshot"),
    }
    Ok(outcome.snapshot)
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Drop the optional `#` users put in front of project names.
pub(crate) fn strip_hash(path: &str) -> &str {
    path.strip_prefix('#').unwrap_or(path)
}

/// Split `A/B/C` into (`Some("A/B")`, `"C"`); a single segment has no parent.
pub(crate) fn split_parent(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('/') {
        Some((parent, name)) => (Some(parent), name),
        None => (None, path),
    }
}

/// Pull (project, text) out of `[#]PROJECT TEXT` or `-p PROJECT TEXT`.
pub(crate) fn task_target(args: &TaskTargetArgs) -> Result<(&str, &str), String> {
    match (args.project.as_deref(), args.args.as_slice()) {
        (Some(project), [text]) => Ok((strip_hash(project), text.as_str())),
        (None, [project, text]) => Ok((strip_hash(project), text.as_str())),
        (Some(_), _) => Err("expected only the task text when --project is given".into()),
        (None, _) => Err("expected a project and the task text".into()),
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(
    args: ListArgs,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(config)?;
    let forest = build_forest(&snapshot);

    let starts = if args.paths.is_empty() {
        forest.roots().to_vec()
    } else {
        let mut starts = Vec::new();
        for path in &args.paths {
            let (_, found) = resolve_by_name(strip_hash(path), &forest)?;
            starts.push(found);
        }
        starts
    };

    if json {
        let list = ProjectListJson {
            projects: starts.iter().map(|&r| project_to_json(&forest, r)).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&list)?);
    } else {
        let indent = if args.paths.is_empty() {
            println!("# Projects");
            1
        } else {
            0
        };
        for r in starts {
            for line in format_project_tree(&forest, &forest.walk_subtree(r), indent) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn cmd_tasks(
    args: TasksArgs,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = load_snapshot(config)?;
    let forest = build_forest(&snapshot);

    let mut found = Vec::new();
    for path in &args.paths {
        found.push(resolve_by_name(strip_hash(path), &forest)?);
    }

    if json {
        let results: Vec<_> = found
            .iter()
            .map(|(path, r)| project_tasks_to_json(&forest, path, *r))
            .collect();
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        for (path, r) in &found {
            for line in format_project_tasks(&forest, path, *r) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn cmd_version() {
    println!("{} v{}", crate::PROG, env!("CARGO_PKG_VERSION"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn target(project: Option<&str>, args: &[&str]) -> TaskTargetArgs {
        TaskTargetArgs {
            project: project.map(String::from),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn hash_is_optional() {
        assert_eq!(strip_hash("#Work"), "Work");
        assert_eq!(strip_hash("Work"), "Work");
        assert_eq!(strip_hash("#Work/Reports"), "Work/Reports");
    }

    #[test]
    fn parent_split() {
        assert_eq!(split_parent("Work"), (None, "Work"));
        assert_eq!(split_parent("Work/Reports"), (Some("Work"), "Reports"));
        assert_eq!(split_parent("A/B/C"), (Some("A/B"), "C"));
    }

    #[test]
    fn positional_target() {
        let args = target(None, &["#Work", "Email Bob"]);
        assert_eq!(task_target(&args), Ok(("Work", "Email Bob")));
    }

    #[test]
    fn flag_target() {
        let args = target(Some("Work/Reports"), &["Write summary"]);
        assert_eq!(task_target(&args), Ok(("Work/Reports", "Write summary")));
    }

    #[test]
    fn malformed_targets() {
        assert!(task_target(&target(None, &["only text"])).is_err());
        assert!(task_target(&target(Some("Work"), &["a", "b"])).is_err());
    }
}
