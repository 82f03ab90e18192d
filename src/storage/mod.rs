//! Asynchronous single-writer storage
//!
//! Workers hand page content to the sink without blocking; one dedicated
//! writer task owns the append-only output file and drains the queue in
//! enqueue order. A single owner means no file locking and no interleaved
//! partial records. Shutdown closes the channel: the writer finishes the
//! queued backlog, then exits.

use crate::CrawlError;
use chrono::Utc;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

const STOP_TIMEOUT: Duration = Duration::from_secs(3);

/// The unit written to storage.
///
/// Owned exclusively by the writer once queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    pub url: String,
    pub timestamp_ms: i64,
    pub content: String,
}

/// Cloneable producer side of the storage queue.
#[derive(Debug, Clone)]
pub struct StorageHandle {
    tx: mpsc::UnboundedSender<PageRecord>,
}

impl StorageHandle {
    /// Enqueues a page for the writer; never blocks.
    ///
    /// Fails only if the writer task is gone, which a worker treats as a
    /// crash condition rather than silently dropping pages.
    pub fn store(&self, url: &str, content: &str) -> Result<(), CrawlError> {
        let record = PageRecord {
            url: url.to_string(),
            timestamp_ms: Utc::now().timestamp_millis(),
            content: content.to_string(),
        };
        self.tx
            .send(record)
            .map_err(|_| CrawlError::Storage("storage writer has shut down".to_string()))
    }
}

/// Owner of the writer task and the last sender.
pub struct StorageSink {
    tx: mpsc::UnboundedSender<PageRecord>,
    writer: tokio::task::JoinHandle<()>,
}

impl StorageSink {
    /// Opens `path` for append and starts the writer task.
    ///
    /// An unopenable output file is fatal to the whole process, so the
    /// error propagates instead of being logged away.
    pub fn start(path: &Path) -> Result<Self, CrawlError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::task::spawn_blocking(move || writer_loop(file, rx));
        Ok(Self { tx, writer })
    }

    /// Returns a producer handle for workers.
    pub fn handle(&self) -> StorageHandle {
        StorageHandle {
            tx: self.tx.clone(),
        }
    }

    /// Closes the queue and waits (bounded) for the writer to drain it.
    ///
    /// Callers must drop worker-held handles first; the writer only sees
    /// end-of-queue once every sender is gone.
    pub async fn stop(self) {
        let Self { tx, writer } = self;
        drop(tx);
        match tokio::time::timeout(STOP_TIMEOUT, writer).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => tracing::error!("storage writer task failed: {}", err),
            Err(_) => tracing::warn!("storage writer did not drain within {:?}", STOP_TIMEOUT),
        }
    }
}

/// Sole consumer of the write queue and sole owner of the file handle.
///
/// `blocking_recv` keeps yielding queued records after the channel closes,
/// which gives drain-then-terminate for free.
fn writer_loop(file: File, mut rx: mpsc::UnboundedReceiver<PageRecord>) {
    let mut out = BufWriter::new(file);
    while let Some(record) = rx.blocking_recv() {
        if let Err(err) = write_record(&mut out, &record) {
            tracing::error!("failed to write record for {}: {}", record.url, err);
            break;
        }
    }
    if let Err(err) = out.flush() {
        tracing::error!("failed to flush storage file: {}", err);
    }
}

fn write_record(out: &mut BufWriter<File>, record: &PageRecord) -> std::io::Result<()> {
    writeln!(out, "##### {} # {} #####", record.url, record.timestamp_ms)?;
    writeln!(out, "{}", record.content)?;
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_records_written_in_order_with_delimiters() {
        let file = NamedTempFile::new().unwrap();
        let sink = StorageSink::start(file.path()).unwrap();
        let handle = sink.handle();

        handle.store("https://example.com/a", "<html>alpha</html>").unwrap();
        handle.store("https://example.com/b", "<html>beta</html>").unwrap();
        handle.store("https://example.com/c", "<html>gamma</html>").unwrap();
        drop(handle);
        sink.stop().await;

        let written = std::fs::read_to_string(file.path()).unwrap();
        let markers: Vec<&str> = written
            .lines()
            .filter(|line| line.starts_with("##### "))
            .collect();
        assert_eq!(markers.len(), 3);
        assert!(markers[0].contains("https://example.com/a"));
        assert!(markers[1].contains("https://example.com/b"));
        assert!(markers[2].contains("https://example.com/c"));
        assert!(written.contains("<html>alpha</html>"));

        // Marker line format: ##### <url> # <timestampMs> #####
        let fields: Vec<&str> = markers[0].split(" # ").collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0], "##### https://example.com/a");
        let ts_field = fields[1].strip_suffix(" #####").unwrap();
        assert!(ts_field.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn test_records_separated_by_blank_line() {
        let file = NamedTempFile::new().unwrap();
        let sink = StorageSink::start(file.path()).unwrap();
        let handle = sink.handle();

        handle.store("https://example.com/1", "one").unwrap();
        handle.store("https://example.com/2", "two").unwrap();
        drop(handle);
        sink.stop().await;

        let written = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        // marker, content, blank, marker, content, blank
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[2], "");
        assert!(lines[3].starts_with("##### "));
    }

    #[tokio::test]
    async fn test_stop_drains_pending_records() {
        let file = NamedTempFile::new().unwrap();
        let sink = StorageSink::start(file.path()).unwrap();
        let handle = sink.handle();

        for i in 0..100 {
            handle
                .store(&format!("https://example.com/{}", i), "body")
                .unwrap();
        }
        drop(handle);
        sink.stop().await;

        let written = std::fs::read_to_string(file.path()).unwrap();
        let count = written
            .lines()
            .filter(|line| line.starts_with("##### "))
            .count();
        assert_eq!(count, 100);
    }

    #[tokio::test]
    async fn test_store_fails_after_writer_gone() {
        let file = NamedTempFile::new().unwrap();
        let sink = StorageSink::start(file.path()).unwrap();
        let handle = sink.handle();
        sink.stop().await;

        let result = handle.store("https://example.com/", "late");
        assert!(matches!(result, Err(CrawlError::Storage(_))));
    }

    #[tokio::test]
    async fn test_start_fails_on_unopenable_path() {
        let result = StorageSink::start(Path::new("/nonexistent-dir/out.txt"));
        assert!(matches!(result, Err(CrawlError::Io(_))));
    }
}
