//! Periodic full flush of a store.
//!
//! ## Architecture
//!
//! ```text
//!   owner ── CancellationScope::cancel() ──┐  (drops the only Sender)
//!                                          ▼
//!   flush thread:  select! { tick(interval) => target.upgrade()?.clear()
//!                            done          => exit }
//! ```
//!
//! The thread holds only a `Weak` reference to its target. It exits when the
//! scope is cancelled or when the target has been dropped; otherwise it keeps
//! flushing for the target's whole lifetime. Flushes are always full clears.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, select};
use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::error::ConfigError;

struct ScopeInner {
    cancelled: AtomicBool,
    signal: Mutex<Option<Sender<()>>>,
    done: Receiver<()>,
}

/// Cooperative cancellation signal shared between an owner and its
/// background flush tasks.
///
/// Clones observe the same signal. Dropping a scope does not cancel it; only
/// [`CancellationScope::cancel`] does.
#[derive(Clone)]
pub struct CancellationScope {
    inner: Arc<ScopeInner>,
}

impl CancellationScope {
    /// Creates a scope that stays active until cancelled.
    pub fn new() -> Self {
        let (signal, done) = crossbeam_channel::bounded(0);
        Self {
            inner: Arc::new(ScopeInner {
                cancelled: AtomicBool::new(false),
                signal: Mutex::new(Some(signal)),
                done,
            }),
        }
    }

    /// Signals every task bound to this scope to stop. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        // Disconnecting the channel wakes every receiver.
        self.inner.signal.lock().take();
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    pub(crate) fn done(&self) -> Receiver<()> {
        self.inner.done.clone()
    }
}

impl Default for CancellationScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancellationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellationScope")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Spawns a thread calling `flush` on `target` every `interval`.
pub(crate) fn spawn_flusher<T, F>(
    target: Weak<T>,
    flush: F,
    interval: Duration,
    scope: &CancellationScope,
) -> Result<(), ConfigError>
where
    T: ?Sized + Send + Sync + 'static,
    F: Fn(&T) + Send + 'static,
{
    if interval.is_zero() {
        return Err(ConfigError::new("flush interval must be > 0"));
    }
    if scope.is_cancelled() {
        debug!("flush scope already cancelled; flusher not started");
        return Ok(());
    }

    // The thread keeps its own clone so dropping the owner's scope never
    // disconnects the signal.
    let scope = scope.clone();
    thread::Builder::new()
        .name("memokit-flush".to_string())
        .spawn(move || {
            debug!(?interval, "flusher started");
            let done = scope.done();
            let ticker = crossbeam_channel::tick(interval);
            loop {
                select! {
                    recv(ticker) -> _ => match target.upgrade() {
                        Some(store) => {
                            flush(&store);
                            trace!("periodic flush");
                        },
                        None => break,
                    },
                    recv(done) -> _ => break,
                }
            }
            debug!("flusher stopped");
        })
        .map_err(|err| ConfigError::new(format!("failed to spawn flush thread: {err}")))?;
    Ok(())
}
