//! A minimal Todoist client: mirrors the account into a local snapshot,
//! projects it into a project tree, and resolves projects and tasks by
//! path and name.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;

/// Program name, used for config and cache directories
pub const PROG: &str = "todoister";
