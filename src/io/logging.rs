use std::fs::{self, File, OpenOptions};
use std::io::{self, IsTerminal};
use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Environment variable holding an env-filter directive (`debug`,
/// `todoister=trace`, ...)
pub const LOG_ENV: &str = "TODOISTER_LOG";

/// Install the global tracing subscriber.
///
/// Events go to `log_file` (appended, never rotated) when one is given, and
/// to stderr otherwise. Called once from `main`; a second call is a no-op.
pub fn init(verbose: bool, log_file: Option<&Path>) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let file = log_file.and_then(|path| match open_log_file(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("warning: cannot open log file {}: {}", path.display(), e);
            None
        }
    });

    let _ = match file {
        Some(file) => builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .try_init(),
        None => builder
            .without_time()
            .with_ansi(io::stderr().is_terminal())
            .with_writer(io::stderr)
            .try_init(),
    };
}

/// Open `path` for appending, creating missing parent directories first.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
