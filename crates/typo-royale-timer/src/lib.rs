//! Cancellable, keyed one-shot timers for Typo Royale.
//!
//! When the last player of a round submits, the room shows the settled
//! scoreboard for a few seconds before moving on. That pause is a timer
//! keyed by `(room, round)`, and it must be cancellable: the room can be
//! deleted, restarted, or force-ended while the timer is pending.
//!
//! # Design
//!
//! Each scheduled key owns one spawned Tokio task that sleeps and then
//! sends a [`Fired`] notice on an unbounded channel. A dedicated task
//! drains that channel, locks whatever state owns the [`RoundTimers`],
//! and passes each notice to [`RoundTimers::claim`]. Every schedule gets
//! a fresh ticket, so a notice that was already in flight when its key
//! was cancelled or rescheduled is recognized as stale and dropped.
//!
//! ```ignore
//! let (timers, mut fired_rx) = RoundTimers::new();
//! let timers = Arc::new(Mutex::new(timers));
//! timers.lock().await.schedule(("R1".to_string(), 1), Duration::from_secs(3));
//!
//! tokio::spawn(async move {
//!     while let Some(fired) = fired_rx.recv().await {
//!         if let Some(key) = timers.lock().await.claim(fired) {
//!             // advance the round
//!         }
//!     }
//! });
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, trace};

// ---------------------------------------------------------------------------
// Fired
// ---------------------------------------------------------------------------

/// Notice that a timer's delay elapsed.
///
/// Must be passed back to [`RoundTimers::claim`] before acting on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<K> {
    /// The key the timer was scheduled under.
    pub key: K,
    ticket: u64,
}

// ---------------------------------------------------------------------------
// RoundTimers
// ---------------------------------------------------------------------------

struct Pending {
    ticket: u64,
    task: JoinHandle<()>,
}

/// A set of pending one-shot timers, at most one per key.
pub struct RoundTimers<K> {
    pending: HashMap<K, Pending>,
    next_ticket: u64,
    fired_tx: mpsc::UnboundedSender<Fired<K>>,
}

impl<K> RoundTimers<K>
where
    K: Clone + Eq + Hash + Debug + Send + 'static,
{
    /// Creates an empty timer set and the receiver its notices arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Fired<K>>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        let timers = Self {
            pending: HashMap::new(),
            next_ticket: 1,
            fired_tx,
        };
        (timers, fired_rx)
    }

    /// Schedules `key` to fire after `delay`.
    ///
    /// Returns `false` and leaves the existing timer untouched if `key`
    /// is already pending, so repeated triggers within one round schedule
    /// exactly one transition.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&mut self, key: K, delay: Duration) -> bool {
        if self.pending.contains_key(&key) {
            trace!(?key, "timer already pending, not rescheduling");
            return false;
        }

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        let deadline = Instant::now() + delay;

        let tx = self.fired_tx.clone();
        let fired = Fired {
            key: key.clone(),
            ticket,
        };
        let task = tokio::spawn(async move {
            time::sleep_until(deadline).await;
            // Receiver gone means the owner shut down; nothing to notify.
            let _ = tx.send(fired);
        });

        debug!(?key, delay_ms = delay.as_millis() as u64, "timer scheduled");
        self.pending.insert(key, Pending { ticket, task });
        true
    }

    /// Cancels the timer for `key`. Returns `true` if one was pending.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.pending.remove(key) {
            Some(entry) => {
                entry.task.abort();
                debug!(?key, "timer cancelled");
                true
            }
            None => false,
        }
    }

    /// Cancels every pending timer whose key matches `pred`.
    ///
    /// Returns how many were cancelled.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&K) -> bool) -> usize {
        let mut cancelled = 0;
        self.pending.retain(|key, entry| {
            if pred(key) {
                entry.task.abort();
                debug!(?key, "timer cancelled");
                cancelled += 1;
                false
            } else {
                true
            }
        });
        cancelled
    }

    /// Accepts a [`Fired`] notice.
    ///
    /// Returns the key if the notice belongs to the live timer for that
    /// key (removing it), or `None` if the timer was cancelled or
    /// replaced after the notice was sent.
    pub fn claim(&mut self, fired: Fired<K>) -> Option<K> {
        match self.pending.get(&fired.key) {
            Some(entry) if entry.ticket == fired.ticket => {
                self.pending.remove(&fired.key);
                trace!(key = ?fired.key, "timer fired");
                Some(fired.key)
            }
            _ => {
                trace!(key = ?fired.key, "stale timer notice dropped");
                None
            }
        }
    }

    /// Whether a timer is pending for `key`.
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.contains_key(key)
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<K> Drop for RoundTimers<K> {
    fn drop(&mut self) {
        for entry in self.pending.values() {
            entry.task.abort();
        }
    }
}
