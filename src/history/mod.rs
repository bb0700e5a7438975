//! Chat history persistence.
//!
//! The engine only needs two capabilities from storage:
//! - [`HistorySink`]: append one [`HistoryRecord`] (called from the read supervisor);
//! - [`HistorySource`]: load everything stored so far (called once at startup).
//!
//! ## Contents
//! - [`FileHistory`] append-only text file, implements both traits
//! - [`NoHistory`] persistence disabled: appends are discarded, loads are empty
//! - [`HistoryLoader`] one-shot task seeding the inbound queue
//!
//! Storage format and durability are the implementor's concern; the engine
//! never reads back what it wrote except through [`HistorySource::load`].

mod file;
mod loader;
mod record;

use std::io;

use async_trait::async_trait;

pub use file::FileHistory;
pub use loader::HistoryLoader;
pub use record::HistoryRecord;

/// Append-only history store.
#[async_trait]
pub trait HistorySink: Send + Sync + 'static {
    /// Persists one record.
    async fn append(&self, record: &HistoryRecord) -> io::Result<()>;
}

/// Bulk reader over the stored history.
#[async_trait]
pub trait HistorySource: Send + Sync + 'static {
    /// Returns the whole stored history as one blob (empty when nothing is stored).
    async fn load(&self) -> io::Result<String>;
}

/// Disabled persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHistory;

#[async_trait]
impl HistorySink for NoHistory {
    async fn append(&self, _record: &HistoryRecord) -> io::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl HistorySource for NoHistory {
    async fn load(&self) -> io::Result<String> {
        Ok(String::new())
    }
}
