use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "todoister", about = concat!("todoister v", env!("CARGO_PKG_VERSION"), " - a minimal Todoist client"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Todoist API token (overrides config file and TODOIST_TOKEN)
    #[arg(short = 't', long, global = true)]
    pub token: Option<String>,

    /// Config file (default: ~/.config/todoister/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr (or the configured log file)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List projects and subprojects
    #[command(visible_aliases = ["ls", "projects"])]
    List(ListArgs),
    /// List project tasks
    #[command(visible_alias = "items")]
    Tasks(TasksArgs),
    /// Add a new resource
    Add(AddCmd),
    /// Mark a task as completed
    Check(CheckArgs),
    /// Delete a resource
    #[command(visible_aliases = ["del", "rm"])]
    Delete(DeleteCmd),
    /// Print the version number
    Version,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ListArgs {
    /// Projects to list, by name or path (e.g. Work/Reports); all if omitted.
    /// Names are case-insensitive.
    pub paths: Vec<String>,
}

#[derive(Args)]
pub struct TasksArgs {
    /// Projects whose tasks to list, by name or path. Names are case-insensitive.
    #[arg(required = true)]
    pub paths: Vec<String>,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddCmd {
    #[command(subcommand)]
    pub command: AddCommands,
}

#[derive(Subcommand)]
pub enum AddCommands {
    /// Add a new project: [PARENT/.../]NAME
    Project(AddProjectArgs),
    /// Add a new task to a project: [#]PROJECT TASK, or -p PROJECT TASK
    Task(AddTaskArgs),
}

#[derive(Args)]
pub struct AddProjectArgs {
    /// Project path; every segment but the last must already exist
    pub path: String,
    /// Project color (berry_red, red, orange, ..., taupe)
    #[arg(short, long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct AddTaskArgs {
    #[command(flatten)]
    pub target: TaskTargetArgs,
    /// Due date: YYYY-MM-DD, YYYY-MM-DD HH:MM[:SS], or natural language
    /// ('tomorrow', 'every monday')
    #[arg(short, long)]
    pub due: Option<String>,
}

/// `[#]PROJECT TEXT` or `-p PROJECT TEXT`. A single PROJECT name means a
/// top-level project; nested projects need the full path.
#[derive(Args)]
pub struct TaskTargetArgs {
    /// Project name or path (e.g. 'Work' or 'Work/Reports')
    #[arg(short, long)]
    pub project: Option<String>,
    /// [#][PARENT/.../]PROJECT followed by the task text, or just the task
    /// text when --project is given
    #[arg(required = true, num_args = 1..=2, value_names = ["PROJECT", "TASK"])]
    pub args: Vec<String>,
}

#[derive(Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub target: TaskTargetArgs,
}

#[derive(Args)]
pub struct DeleteCmd {
    #[command(subcommand)]
    pub command: DeleteCommands,
}

#[derive(Subcommand)]
pub enum DeleteCommands {
    /// Delete a project and all its descendants
    Project(DeleteProjectArgs),
}

#[derive(Args)]
pub struct DeleteProjectArgs {
    /// Project path: [PARENT/.../]NAME
    pub path: String,
    /// Required: confirm deletion of the project, its subprojects and tasks
    #[arg(short, long)]
    pub force: bool,
}
