//! Run logging for the binaries.
//!
//! Records go to `<log_dir>/<file_name>` (appended) and to stderr, as
//! `<timestamp> - <LEVEL> - <message>`. The filter defaults to `info`
//! and can be changed with `RUST_LOG`.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Local;
use env_logger::{Builder, Env, Target};

/// Installed logger. Dropping it flushes the log file.
pub struct LogContext {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl LogContext {
    /// Install the global logger. Fails if the log file cannot be opened
    /// or a logger is already installed.
    pub fn init(log_dir: &Path, file_name: &str) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;
        let path = log_dir.join(file_name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let file = Arc::new(Mutex::new(file));

        Builder::from_env(Env::default().default_filter_or("info"))
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} - {} - {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                    record.level(),
                    record.args()
                )
            })
            .target(Target::Pipe(Box::new(TeeWriter {
                file: Arc::clone(&file),
                console: io::stderr(),
            })))
            .try_init()
            .map_err(io::Error::other)?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LogContext {
    fn drop(&mut self) {
        log::logger().flush();
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Writes every record to the log file and to a console stream.
struct TeeWriter<W> {
    file: Arc<Mutex<File>>,
    console: W,
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut file) = self.file.lock() {
            file.write_all(buf)?;
        }
        self.console.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Ok(mut file) = self.file.lock() {
            file.flush()?;
        }
        self.console.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tee_writes_both_sinks_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.log");
        fs::write(&path, "earlier run\n").unwrap();

        let file = OpenOptions::new().append(true).open(&path).unwrap();
        let mut tee = TeeWriter {
            file: Arc::new(Mutex::new(file)),
            console: Vec::new(),
        };
        tee.write_all(b"2024-03-05 10:00:00,000 - INFO - hello\n").unwrap();
        tee.flush().unwrap();

        assert_eq!(tee.console, b"2024-03-05 10:00:00,000 - INFO - hello\n");
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "earlier run\n2024-03-05 10:00:00,000 - INFO - hello\n"
        );
    }
}
