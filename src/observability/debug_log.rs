use std::fs::{File, OpenOptions};
use std::io::Write;

use parking_lot::Mutex;

/// Append-only request/response debug log.
///
/// Created fresh on startup (the previous session's file is truncated) and
/// owned by the application state; handlers record into it per exchange.
/// Recording never fails the exchange: write errors are swallowed.
pub struct DebugLog {
    file: Mutex<File>,
}

impl DebugLog {
    /// Open (and truncate) the log file at `path`.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the file cannot be created.
    pub fn create(path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Record a titled body. JSON bodies are pretty-printed; anything else
    /// is recorded raw.
    pub fn record(&self, title: &str, body: &str) {
        let rendered = serde_json::from_str::<serde_json::Value>(body)
            .and_then(|value| serde_json::to_string_pretty(&value))
            .unwrap_or_else(|_| body.to_string());
        self.write_entry(title, &rendered);
    }

    /// Record a titled, already-structured body.
    pub fn record_value<T: serde::Serialize>(&self, title: &str, body: &T) {
        let rendered =
            serde_json::to_string_pretty(body).unwrap_or_else(|e| format!("<unserializable: {e}>"));
        self.write_entry(title, &rendered);
    }

    fn write_entry(&self, title: &str, body: &str) {
        let timestamp = httpdate::fmt_http_date(std::time::SystemTime::now());
        let mut file = self.file.lock();
        let _ = writeln!(file, "--- {timestamp} --- {title} ---\n{body}\n--- End of {title} ---\n");
    }
}
