//! Output file watcher with debouncing.
//!
//! The compiler gives no signal on stdout when it has finished writing its
//! `--outFile`, so the only reliable way to observe an emit is to watch the
//! file itself. Raw filesystem events are coalesced with a reset timer and the
//! file is read once things go quiet; a read is only delivered when its
//! content differs from the previous delivery.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify::event::{AccessKind, AccessMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// Quiet period before a burst of writes is considered settled.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(50);

/// New content observed at the watched path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentEvent {
    pub content: String,
}

/// Watches a single output file.
///
/// Dropping the watcher disposes it.
pub struct OutputWatcher {
    path: PathBuf,
    watcher: Option<RecommendedWatcher>,
    debounce_task: Option<JoinHandle<()>>,
    disposed: Arc<AtomicBool>,
}

impl OutputWatcher {
    /// Provision `path` (parent directories plus an empty file) and start
    /// watching it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch(
        path: impl AsRef<Path>,
        debounce: Duration,
    ) -> notify::Result<(Self, mpsc::Receiver<ContentEvent>)> {
        let target = provision(path.as_ref())?;
        let parent = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = target.file_name().map(|n| n.to_os_string());

        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<()>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    warn!("watch error: {}", err);
                    return;
                }
            };
            if !is_write(&event.kind) {
                return;
            }
            let touches_target = event
                .paths
                .iter()
                .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
            if touches_target {
                let _ = raw_tx.send(());
            }
        })?;
        watcher.watch(&parent, RecursiveMode::NonRecursive)?;
        debug!("watching {}", target.display());

        let (tx, rx) = mpsc::channel(16);
        let disposed = Arc::new(AtomicBool::new(false));
        let debounce_task = tokio::spawn(debounce_loop(
            target.clone(),
            debounce,
            raw_rx,
            tx,
            disposed.clone(),
        ));

        Ok((
            Self {
                path: target,
                watcher: Some(watcher),
                debounce_task: Some(debounce_task),
                disposed,
            },
            rx,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stop watching. Events already queued are not delivered.
    pub fn dispose(&mut self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.watcher.take();
        if let Some(task) = self.debounce_task.take() {
            task.abort();
        }
        trace!("disposed watcher for {}", self.path.display());
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }
}

impl Drop for OutputWatcher {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn is_write(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Modify(_) => true,
        EventKind::Access(AccessKind::Close(AccessMode::Write)) => true,
        _ => false,
    }
}

/// Create the parent directories and an empty file at `path`.
///
/// Returns the absolute path of the file with a canonical parent, which is
/// how the platform watcher reports it.
fn provision(path: &Path) -> notify::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(notify::Error::io)?
            .join(path)
    };
    let file_name = absolute
        .file_name()
        .ok_or_else(|| notify::Error::generic("watch target has no file name"))?
        .to_os_string();
    let parent = absolute
        .parent()
        .ok_or_else(|| notify::Error::generic("watch target has no parent directory"))?;

    std::fs::create_dir_all(parent).map_err(notify::Error::io)?;
    let parent = std::fs::canonicalize(parent).map_err(notify::Error::io)?;
    let target = parent.join(file_name);
    std::fs::write(&target, "").map_err(notify::Error::io)?;
    Ok(target)
}

async fn debounce_loop(
    path: PathBuf,
    debounce: Duration,
    mut raw_rx: mpsc::UnboundedReceiver<()>,
    tx: mpsc::Sender<ContentEvent>,
    disposed: Arc<AtomicBool>,
) {
    // The file was provisioned empty.
    let mut last_seen = String::new();

    while raw_rx.recv().await.is_some() {
        // Reset the timer on every raw event until the writes go quiet.
        loop {
            match tokio::time::timeout(debounce, raw_rx.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return,
                Err(_) => break,
            }
        }
        if disposed.load(Ordering::SeqCst) {
            return;
        }

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) => {
                warn!("unable to read {}: {}", path.display(), err);
                continue;
            }
        };
        if content == last_seen {
            trace!("{} unchanged, skipping", path.display());
            continue;
        }
        last_seen.clone_from(&content);

        if disposed.load(Ordering::SeqCst) || tx.send(ContentEvent { content }).await.is_err() {
            return;
        }
    }
}
