/// Append-only log file output
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Log directory and file name
const LOG_DIR: &str = "logs";
const LOG_FILE_NAME: &str = "launchpad-sync.log";

static LOG_WRITER: Lazy<Mutex<Option<BufWriter<File>>>> = Lazy::new(|| Mutex::new(None));

/// Open the log file; console logging keeps working if this fails
pub fn init_file_logging() {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("Failed to create log directory '{}': {}", LOG_DIR, e);
        return;
    }

    let path = Path::new(LOG_DIR).join(LOG_FILE_NAME);
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            *LOG_WRITER.lock() = Some(BufWriter::new(file));
        }
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", path.display(), e);
        }
    }
}

/// Write a single line; no-op before initialization
pub fn write_to_file(line: &str) {
    let mut guard = LOG_WRITER.lock();
    if let Some(writer) = guard.as_mut() {
        let _ = writeln!(writer, "{}", line);
    }
}

pub fn flush_file_logging() {
    if let Some(writer) = LOG_WRITER.lock().as_mut() {
        let _ = writer.flush();
    }
}
