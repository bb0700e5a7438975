use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::{HistoryRecord, HistorySink, HistorySource};

/// Append-only text file holding one rendered [`HistoryRecord`] per entry.
///
/// The file is opened per append, so an external rotation or deletion is
/// picked up on the next record. A missing file loads as empty history.
#[derive(Debug, Clone)]
pub struct FileHistory {
    path: PathBuf,
}

impl FileHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl HistorySink for FileHistory {
    async fn append(&self, record: &HistoryRecord) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(record.to_string().as_bytes()).await?;
        file.flush().await
    }
}

#[async_trait]
impl HistorySource for FileHistory {
    async fn load(&self) -> io::Result<String> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[tokio::test]
    async fn append_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let history = FileHistory::new(dir.path().join("history.txt"));
        let at = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 0).unwrap();

        history.append(&HistoryRecord::at(at, "one\n")).await.unwrap();
        history.append(&HistoryRecord::at(at, "two\n")).await.unwrap();

        assert_eq!(
            history.load().await.unwrap(),
            "[02.01.24 03:04] one\n[02.01.24 03:04] two\n"
        );
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = FileHistory::new(dir.path().join("absent.txt"));
        assert_eq!(history.load().await.unwrap(), "");
    }
}
