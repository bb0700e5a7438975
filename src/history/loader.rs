//! # HistoryLoader: one-shot history replay.
//!
//! Reads the stored history in one go and pushes it as a **single** inbound
//! item. The client runs it to completion before the read supervisor starts,
//! so the replay always precedes live traffic.
//!
//! A load failure is logged and skipped; it never blocks live chat.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::HistorySource;

/// Seeds the inbound queue from a [`HistorySource`].
pub struct HistoryLoader {
    source: Arc<dyn HistorySource>,
    inbound: mpsc::UnboundedSender<String>,
}

impl HistoryLoader {
    pub fn new(source: Arc<dyn HistorySource>, inbound: mpsc::UnboundedSender<String>) -> Self {
        Self { source, inbound }
    }

    /// Loads the history and enqueues it. Returns `true` if an item was pushed.
    pub async fn run(self) -> bool {
        let blob = match self.source.load().await {
            Ok(blob) => blob,
            Err(e) => {
                warn!(error = %e, "history load failed; starting without replay");
                return false;
            }
        };
        if blob.is_empty() {
            debug!("history empty; nothing to replay");
            return false;
        }
        debug!(bytes = blob.len(), "replaying history");
        self.inbound.send(blob).is_ok()
    }
}
