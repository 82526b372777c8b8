// Append each event's message as one line to a local file.
//
// The handle is opened on first delivery and shared behind an async mutex.
// A failed open or write leaves no handle behind, so the next event opens
// the file again.

use crate::domain::LogEvent;
use crate::error::RelayError;
use crate::port::{DeliveryFuture, LogSink};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

pub struct FileSink {
    level: i64,
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileSink {
    pub fn new(level: i64, path: PathBuf) -> Self {
        Self {
            level,
            path,
            file: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(path: &Path) -> std::io::Result<File> {
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        options.mode(0o600);
        options.open(path).await
    }

    async fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut guard = self.file.lock().await;
        let mut file = match guard.take() {
            Some(file) => file,
            None => Self::open(&self.path).await?,
        };

        let written = async {
            file.write_all(line.as_bytes()).await?;
            file.write_all(b"\n").await?;
            file.flush().await
        }
        .await;

        // Only a handle that just wrote cleanly goes back for reuse.
        if written.is_ok() {
            *guard = Some(file);
        }
        written
    }
}

impl LogSink for FileSink {
    fn name(&self) -> &str {
        "fileout"
    }

    fn minimum_level(&self) -> i64 {
        self.level
    }

    fn deliver<'a>(&'a self, event: &'a LogEvent) -> DeliveryFuture<'a> {
        Box::pin(async move {
            self.write_line(&event.message).await.map_err(|e| {
                RelayError::delivery(
                    self.name(),
                    format!("failed to write {}: {e}", self.path.display()),
                )
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn event(message: &str) -> LogEvent {
        LogEvent::new(20, message, "127.0.0.1:1", "alice")
    }

    #[tokio::test]
    async fn test_file_sink_creates_and_appends() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("relay.log");
        let sink = FileSink::new(10, path.clone());

        sink.deliver(&event("first")).await.unwrap();
        sink.deliver(&event("second")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }

    #[tokio::test]
    async fn test_file_sink_keeps_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("relay.log");
        std::fs::write(&path, "earlier\n").unwrap();

        let sink = FileSink::new(10, path.clone());
        sink.deliver(&event("later")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "earlier\nlater\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_file_sink_creates_private_file() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("private.log");
        let sink = FileSink::new(0, path.clone());
        sink.deliver(&event("secret")).await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_file_sink_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("relay.log");
        let sink = FileSink::new(0, path);

        let result = sink.deliver(&event("lost")).await;
        assert!(matches!(result, Err(RelayError::Delivery { .. })));
    }

    #[tokio::test]
    async fn test_file_sink_retries_open_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("later");
        let path = dir.join("relay.log");
        let sink = FileSink::new(0, path.clone());

        assert!(sink.deliver(&event("lost")).await.is_err());
        assert!(!path.exists());

        std::fs::create_dir(&dir).unwrap();
        sink.deliver(&event("kept")).await.unwrap();
        sink.deliver(&event("kept too")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "kept\nkept too\n");
    }

    #[tokio::test]
    async fn test_concurrent_deliveries_produce_whole_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("relay.log");
        let sink = Arc::new(FileSink::new(0, path.clone()));

        let mut handles = Vec::new();
        for i in 0..20 {
            let sink = sink.clone();
            handles.push(tokio::spawn(async move {
                sink.deliver(&event(&format!("line-{i}"))).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines: Vec<&str> = contents.lines().collect();
        lines.sort_unstable();
        let mut expected: Vec<String> = (0..20).map(|i| format!("line-{i}")).collect();
        expected.sort_unstable();
        assert_eq!(lines, expected);
    }
}
