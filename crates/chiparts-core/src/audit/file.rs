//! Append-only order log on the local filesystem

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, error};

use crate::error::Result;
use crate::models::Order;
use crate::notify::ORDER_MARKER;

/// Text file that receives one entry per handled order.
///
/// Each entry is a `[timestamp] НОВАЯ ЗАЯВКА` header line, the pretty-printed
/// JSON record and a blank line. The record is written with non-ASCII
/// characters escaped, so the marker only ever appears in header lines.
/// Appends are serialized through an async mutex so concurrent requests
/// never interleave their bytes.
pub struct AuditLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AuditLog {
    /// Create a log backed by `path`; the file is created on first append
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an order. Failures are logged and never returned.
    pub async fn append(&self, order: &Order) {
        if let Err(e) = self.try_append(order).await {
            error!(path = %self.path.display(), error = %e, "Failed to write order log");
        }
    }

    /// Append an order, surfacing write errors
    pub async fn try_append(&self, order: &Order) -> Result<()> {
        let entry = render_entry(order)?;

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(entry.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %self.path.display(), bytes = entry.len(), "Order logged");
        Ok(())
    }

    /// Number of marker occurrences in the whole log; 0 when the file is missing
    pub async fn count_marker(&self) -> Result<usize> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content.matches(ORDER_MARKER).count()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }
}

fn render_entry(order: &Order) -> Result<String> {
    let mut body = Vec::with_capacity(256);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut body, AsciiFormatter::default());
    order.serialize(&mut serializer)?;
    let body = String::from_utf8(body).map_err(|e| crate::error::Error::internal(e.to_string()))?;

    Ok(format!("[{}] {}\n{}\n\n", order.timestamp, ORDER_MARKER, body))
}

/// Pretty JSON with every non-ASCII character written as `\uXXXX`
#[derive(Default)]
struct AsciiFormatter {
    pretty: PrettyFormatter<'static>,
}

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W: ?Sized + Write>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()> {
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }

    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn order(name: &str, sent_to: usize) -> Order {
        Order {
            timestamp: "18.10.2026, 12:00:00".to_string(),
            name: name.to_string(),
            phone: "+79001234567".to_string(),
            car_brand: None,
            car_model: None,
            part_name: "bumper".to_string(),
            comment: "Без комментария".to_string(),
            source: Some("website".to_string()),
            sent_to,
        }
    }

    #[tokio::test]
    async fn test_missing_file_counts_zero() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::new(dir.path().join("orders.log"));

        assert_eq!(log.count_marker().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_append_writes_entry_layout() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::new(dir.path().join("orders.log"));

        log.append(&order("Ivan", 1)).await;

        let content = std::fs::read_to_string(log.path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("[18.10.2026, 12:00:00] НОВАЯ ЗАЯВКА"));
        assert_eq!(lines.next(), Some("{"));
        assert!(content.ends_with("}\n\n"));

        let json_start = content.find('{').unwrap();
        let record: Order = serde_json::from_str(content[json_start..].trim()).unwrap();
        assert_eq!(record, order("Ivan", 1));
    }

    #[tokio::test]
    async fn test_count_tracks_appends_regardless_of_delivery() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::new(dir.path().join("orders.log"));

        log.append(&order("Ivan", 1)).await;
        log.append(&order("Petr", 0)).await;
        log.append(&order("Anna", 2)).await;

        assert_eq!(log.count_marker().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_marker_in_user_text_is_not_counted() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::new(dir.path().join("orders.log"));
        let mut record = order("НОВАЯ ЗАЯВКА", 1);
        record.comment = "повторная НОВАЯ ЗАЯВКА".to_string();

        log.append(&record).await;

        assert_eq!(log.count_marker().await.unwrap(), 1);
        let content = std::fs::read_to_string(log.path()).unwrap();
        assert!(content.contains("\\u041d"));
        let json_start = content.find('{').unwrap();
        let parsed: Order = serde_json::from_str(content[json_start..].trim()).unwrap();
        assert_eq!(parsed, record);
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let log = Arc::new(AuditLog::new(dir.path().join("orders.log")));

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let log = log.clone();
                tokio::spawn(async move { log.append(&order(&format!("client-{i}"), 1)).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(log.count_marker().await.unwrap(), 32);
        let content = std::fs::read_to_string(log.path()).unwrap();
        for entry in content.split("\n\n").filter(|e| !e.is_empty()) {
            let (header, body) = entry.split_once('\n').unwrap();
            assert!(header.ends_with(ORDER_MARKER));
            let record: Order = serde_json::from_str(body).unwrap();
            assert_eq!(record.sent_to, 1);
        }
    }

    #[tokio::test]
    async fn test_write_failure_is_swallowed() {
        let dir = TempDir::new().unwrap();
        // A directory cannot be opened for appending
        let log = AuditLog::new(dir.path());

        log.append(&order("Ivan", 1)).await;
        assert!(log.try_append(&order("Ivan", 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_unreadable_log_is_an_error() {
        let dir = TempDir::new().unwrap();
        let log = AuditLog::new(dir.path());

        assert!(log.count_marker().await.is_err());
    }
}
