//! Tracing setup. The terminal belongs to the TUI, so events go to a file.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

type LogWriter = Mutex<Box<dyn Write + Send>>;

/// Create the log file, or warn on stderr and return `None`
fn open_log_file(path: &Path) -> Option<File> {
    match File::create(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("warning: cannot open log file {}: {e}; logging disabled", path.display());
            None
        }
    }
}

/// Install a global fmt subscriber writing to `path`.
///
/// The filter comes from `RUST_LOG`, defaulting to `info`. Logging never
/// stops the program: an unwritable path discards events instead. Returns
/// whether events reach the file.
pub fn init(path: &Path) -> bool {
    let file = open_log_file(path);
    let to_file = file.is_some();
    let writer: Box<dyn Write + Send> = match file {
        Some(file) => Box::new(file),
        None => Box::new(io::sink()),
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(LogWriter::new(writer))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .try_init();
    if let Err(e) = installed {
        eprintln!("warning: tracing init failed: {e}");
        return false;
    }
    to_file
}
