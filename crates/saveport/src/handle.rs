//! Deferred readiness for the mounted save directory.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::OnceCell;

use saveport_vfs::VirtualFs;

use crate::error::{Error, Result};

type InitFuture = Pin<Box<dyn Future<Output = saveport_vfs::Result<Arc<dyn VirtualFs>>> + Send>>;
type InitFn = Box<dyn Fn() -> InitFuture + Send + Sync>;

/// Lazily awaited, process-wide handle to the mounted save directory.
///
/// Created once at startup and cloned into everything that needs the
/// filesystem. The initializer runs on first use; concurrent awaiters
/// share the one run, and once it has succeeded the result is never
/// recreated.
#[derive(Clone)]
pub struct SaveDirHandle {
    inner: Arc<Inner>,
}

struct Inner {
    cell: OnceCell<Arc<dyn VirtualFs>>,
    init: InitFn,
}

impl SaveDirHandle {
    /// Wrap an initialization routine that mounts and populates the save
    /// directory.
    pub fn new<F, Fut>(init: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = saveport_vfs::Result<Arc<dyn VirtualFs>>> + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                cell: OnceCell::new(),
                init: Box::new(move || Box::pin(init())),
            }),
        }
    }

    /// Wrap a filesystem that is already mounted and populated.
    pub fn ready(fs: Arc<dyn VirtualFs>) -> Self {
        Self::new(move || {
            let fs = fs.clone();
            async move { Ok(fs) }
        })
    }

    /// Await readiness, running the initializer if it has not run yet.
    pub async fn get(&self) -> Result<Arc<dyn VirtualFs>> {
        let fs = self
            .inner
            .cell
            .get_or_try_init(|| (self.inner.init)())
            .await
            .map_err(Error::Filesystem)?;
        Ok(fs.clone())
    }
}

/// One-time mount sequence: create the save root and pull the durable
/// state into the tree before the handle resolves.
pub async fn prepare_save_dir(
    fs: Arc<dyn VirtualFs>,
    save_root: PathBuf,
) -> saveport_vfs::Result<Arc<dyn VirtualFs>> {
    fs.mkdir(&save_root).await?;
    fs.sync(true).await?;
    Ok(fs)
}
