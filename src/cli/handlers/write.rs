use crate::cli::commands::{
    AddCmd, AddCommands, AddProjectArgs, AddTaskArgs, CheckArgs, DeleteCmd, DeleteCommands,
    DeleteProjectArgs,
};
use crate::cli::output::CreatedJson;
use crate::io::remote::{HttpRemote, RemoteSource};
use crate::model::config::Config;
use crate::model::task::{DueInput, Task};
use crate::ops::resolve::{find_tasks_by_prefix, resolve_project_path};

use super::{load_snapshot, split_parent, strip_hash, task_target};

/// Project colors Todoist accepts
pub const VALID_COLORS: [&str; 20] = [
    "berry_red",
    "red",
    "orange",
    "yellow",
    "olive_green",
    "lime_green",
    "green",
    "mint_green",
    "teal",
    "sky_blue",
    "light_blue",
    "blue",
    "grape",
    "violet",
    "lavender",
    "magenta",
    "salmon",
    "charcoal",
    "grey",
    "taupe",
];

fn validate_color(color: &str) -> Result<(), String> {
    if VALID_COLORS.contains(&color) {
        Ok(())
    } else {
        Err(format!(
            "unknown color '{}' (expected one of: {})",
            color,
            VALID_COLORS.join(", ")
        ))
    }
}

/// Reject empty segments like `Work//Reports` or a trailing slash.
fn validate_project_path(path: &str) -> Result<(), String> {
    if path.split('/').any(|s| s.trim().is_empty()) {
        return Err(format!("invalid project path '{}'", path));
    }
    Ok(())
}

pub fn cmd_add(
    args: AddCmd,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        AddCommands::Project(args) => cmd_add_project(args, config, json),
        AddCommands::Task(args) => cmd_add_task(args, config, json),
    }
}

fn cmd_add_project(
    args: AddProjectArgs,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = strip_hash(&args.path);
    validate_project_path(path)?;
    if let Some(color) = &args.color {
        validate_color(color)?;
    }

    let remote = HttpRemote::from_config(config)?;
    let (parent, name) = split_parent(path);
    let parent_id = match parent {
        Some(parent) => {
            let projects = remote.list_projects()?;
            Some(resolve_project_path(parent, &projects)?.to_string())
        }
        None => None,
    };

    let project = remote.create_project(name, parent_id.as_deref(), args.color.as_deref())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&CreatedJson::from(&project))?);
    } else {
        match parent {
            Some(parent) => println!(
                "Created project '{}' in '{}' (ID: {})",
                project.name, parent, project.id
            ),
            None => println!("Created project '{}' (ID: {})", project.name, project.id),
        }
    }
    Ok(())
}

fn cmd_add_task(
    args: AddTaskArgs,
    config: &Config,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (project_path, content) = task_target(&args.target)?;
    if content.trim().is_empty() {
        return Err("task text cannot be empty".into());
    }
    let due = args.due.as_deref().and_then(DueInput::parse);

    let remote = HttpRemote::from_config(config)?;
    let projects = remote.list_projects()?;
    let project_id = resolve_project_path(project_path, &projects)?;

    let task = remote.create_task(content, project_id, due.as_ref())?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&CreatedJson {
                id: &task.id,
                name: &task.content,
                parent_id: Some(task.project_id.as_str()),
            })?
        );
    } else {
        println!(
            "Created task '{}' in '{}' (ID: {})",
            task.content, project_path, task.id
        );
    }
    Ok(())
}

/// Message for a prefix that names more than one open task
fn ambiguous(prefix: &str, project: &str, matches: &[&Task]) -> String {
    let mut msg = format!(
        "'{}' matches {} tasks in '{}':",
        prefix,
        matches.len(),
        project
    );
    for task in matches {
        msg.push_str(&format!("\n  - {}", task.content));
    }
    msg
}

pub fn cmd_check(args: CheckArgs, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let (project_path, prefix) = task_target(&args.target)?;

    let snapshot = load_snapshot(config)?;
    let project_id = resolve_project_path(project_path, &snapshot.projects)?;

    let task = match find_tasks_by_prefix(project_id, prefix, &snapshot).as_slice() {
        [] => {
            return Err(
                format!("no open task in '{}' starts with '{}'", project_path, prefix).into(),
            );
        }
        [task] => *task,
        many => return Err(ambiguous(prefix, project_path, many).into()),
    };

    let remote = HttpRemote::from_config(config)?;
    remote.close_task(&task.id)?;
    println!("✓ Completed: {}", task.content);
    Ok(())
}

pub fn cmd_delete(args: DeleteCmd, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match args.command {
        DeleteCommands::Project(args) => cmd_delete_project(args, config),
    }
}

fn cmd_delete_project(
    args: DeleteProjectArgs,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = strip_hash(&args.path);
    if !args.force {
        return Err(format!(
            "refusing to delete '{}' and everything under it without --force",
            path
        )
        .into());
    }

    let remote = HttpRemote::from_config(config)?;
    let projects = remote.list_projects()?;
    let project_id = resolve_project_path(path, &projects)?;
    remote.delete_project(project_id)?;
    println!("Deleted project '{}'", path);
    Ok(())
}
