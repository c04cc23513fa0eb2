use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use super::layer::MessageSink;
use super::DiagnosticMessage;

/// Appends one line per message to the active log file.
///
/// Writes are serialized through a mutex so concurrent emitters never
/// interleave bytes within a line. A failed write is dropped.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');

        let mut file = self
            .file
            .lock()
            .map_err(|_| std::io::Error::other("log file lock poisoned"))?;
        file.write_all(record.as_bytes())?;
        file.flush()
    }
}

impl MessageSink for FileSink {
    fn on_message(&self, message: &DiagnosticMessage) {
        let _ = self.append(&message.log_line());
    }
}
