// ── Toast slot ──
//
// One visible message at a time. Each `show` cancels the pending
// dismissal and starts a fresh one, so the window is always measured from
// the latest call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::state::Toast;

pub(crate) struct Toaster {
    current: Arc<watch::Sender<Option<Toast>>>,
    /// Cancels the dismissal timer of the toast on screen.
    pending: Mutex<CancellationToken>,
    next_id: AtomicU64,
    duration: Duration,
}

impl Toaster {
    pub(crate) fn new(duration: Duration) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            current: Arc::new(current),
            pending: Mutex::new(CancellationToken::new()),
            next_id: AtomicU64::new(1),
            duration,
        }
    }

    /// Show `message`, replacing whatever is on screen.
    pub(crate) async fn show(&self, message: String) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        {
            let mut pending = self.pending.lock().await;
            pending.cancel();
            *pending = token.clone();
        }

        self.current.send_replace(Some(Toast { id, message }));

        let current = Arc::clone(&self.current);
        let duration = self.duration;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => trace!(id, "toast dismissal cancelled"),
                () = tokio::time::sleep(duration) => {
                    current.send_if_modified(|slot| {
                        if slot.as_ref().is_some_and(|t| t.id == id) {
                            *slot = None;
                            true
                        } else {
                            false
                        }
                    });
                }
            }
        });
    }

    pub(crate) fn current(&self) -> Option<Toast> {
        self.current.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Option<Toast>> {
        self.current.subscribe()
    }
}
