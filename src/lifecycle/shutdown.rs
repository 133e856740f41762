//! Shutdown coordination.

use tokio::sync::watch;

/// Coordinates draining of the proxy's long-running tasks.
///
/// [`begin_drain`](Self::begin_drain) flips a level-triggered flag that
/// each task watches through its own [`ShutdownSignal`]: the HTTP server
/// stops accepting and drains in-flight requests, while the health
/// monitor and the limiter's maintenance loops exit at their next tick.
/// The flag stays set, so a task that takes its signal only after
/// draining began still observes it.
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Hand out a drain signal for one task to watch.
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Start draining. Idempotent.
    pub fn begin_drain(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// One task's view of the drain flag.
#[derive(Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once draining begins, immediately if it already has. A
    /// dropped coordinator counts as draining.
    pub async fn wait(&mut self) {
        let _ = self.rx.wait_for(|draining| *draining).await;
    }
}
