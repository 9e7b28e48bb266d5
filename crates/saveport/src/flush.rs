//! Debounced advisory flush to durable storage.

use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::Error;
use crate::handle::SaveDirHandle;

const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(100);

/// Coalesces flush requests from the running application into one durable
/// sync after a quiet period; a new request supersedes a pending one.
///
/// This is the advisory path the engine uses between explicit imports:
/// failures are logged and dropped. The import commit does not go through
/// here.
pub struct FlushScheduler {
    handle: SaveDirHandle,
    quiet_period: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl FlushScheduler {
    pub fn new(handle: SaveDirHandle) -> Self {
        Self {
            handle,
            quiet_period: DEFAULT_QUIET_PERIOD,
            pending: Mutex::new(None),
        }
    }

    pub fn quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Request a flush once writes go quiet, replacing any pending request.
    pub fn schedule(&self) {
        let handle = self.handle.clone();
        let quiet_period = self.quiet_period;
        let task = tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            let flushed: crate::Result<()> = async {
                let fs = handle.get().await?;
                fs.sync(false).await.map_err(Error::Persistence)
            }
            .await;
            if let Err(err) = flushed {
                warn!(error = %err, "background save flush failed");
            }
        });
        if let Some(previous) = self.pending.lock().unwrap().replace(task) {
            previous.abort();
        }
    }

    /// Drop any pending flush without running it.
    pub fn cancel(&self) {
        if let Some(task) = self.pending.lock().unwrap().take() {
            task.abort();
        }
    }
}
