use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::AbortHandle;

/// Severity of a toast notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    Info,
}

/// A transient user-facing notification
///
/// `duration_ms == 0` means the toast never expires on its own and stays
/// until explicitly dismissed.
#[derive(Debug, Clone, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
    pub duration_ms: u64,
}

/// A live toast plus the handle of its expiry timer, if it has one.
struct ActiveToast {
    toast: Toast,
    expiry: Option<AbortHandle>,
}

struct Inner {
    toasts: Mutex<Vec<ActiveToast>>,
    next_id: AtomicU64,
}

/// In-memory queue of active toast notifications
///
/// The queue keeps toasts in insertion order. Each toast with a non-zero
/// duration owns an independent expiry timer; the timer and an explicit
/// `dismiss` race for the single removal, and whichever loses observes
/// "not found" and does nothing. Ids come from a monotonic counter, so a
/// removal can never hit a different entry than the one it was issued for.
///
/// Cloning the queue clones a handle to the same collection. All mutation
/// goes through one mutex; timers hold only a weak reference, so a timer
/// that fires after the queue is gone is a no-op instead of a dangling
/// write.
#[derive(Clone)]
pub struct ToastQueue {
    inner: Arc<Inner>,
}

impl ToastQueue {
    /// Create an empty queue. Nothing is persisted; a restart starts blank.
    pub fn new() -> Self {
        ToastQueue {
            inner: Arc::new(Inner {
                toasts: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Append a toast and schedule its expiry
    ///
    /// The new toast goes to the end of the collection. When `duration_ms`
    /// is non-zero an expiry timer is spawned that removes exactly this
    /// toast once the duration elapses. Existing timers are unaffected.
    ///
    /// # Arguments
    /// * `message` - Display text
    /// * `kind` - Toast severity
    /// * `duration_ms` - Lifetime in milliseconds, 0 for no auto-expiry
    ///
    /// # Returns
    /// * `u64` - The unique id assigned to the toast
    pub fn show(&self, message: &str, kind: ToastKind, duration_ms: u64) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let toast = Toast {
            id,
            message: message.to_string(),
            kind,
            duration_ms,
        };

        // Insert and arm the timer under one lock so the toast is visible
        // before its timer can possibly fire.
        let mut toasts = self.inner.toasts.lock().unwrap();
        toasts.push(ActiveToast {
            toast,
            expiry: None,
        });

        if duration_ms > 0 {
            let weak = Arc::downgrade(&self.inner);
            let handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(duration_ms)).await;
                expire(weak, id);
            });
            if let Some(entry) = toasts.last_mut() {
                entry.expiry = Some(handle.abort_handle());
            }
        }

        id
    }

    /// Dismiss a toast by id
    ///
    /// Removes the toast and cancels its expiry timer. Calling this for an
    /// id that was already removed (by an earlier dismiss or by its timer)
    /// is a benign no-op; the remaining toasts keep their order.
    ///
    /// # Returns
    /// * `bool` - Whether a toast was actually removed
    pub fn dismiss(&self, id: u64) -> bool {
        let mut toasts = self.inner.toasts.lock().unwrap();
        match toasts.iter().position(|entry| entry.toast.id == id) {
            Some(index) => {
                let entry = toasts.remove(index);
                if let Some(expiry) = entry.expiry {
                    expiry.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Snapshot of the active toasts in insertion order.
    pub fn active(&self) -> Vec<Toast> {
        let toasts = self.inner.toasts.lock().unwrap();
        toasts.iter().map(|entry| entry.toast.clone()).collect()
    }

    /// Number of active toasts.
    pub fn len(&self) -> usize {
        self.inner.toasts.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every toast and cancel every outstanding timer
    ///
    /// Teardown path for the hosting UI; afterwards the queue is empty and
    /// no scheduled removal is left behind.
    pub fn clear(&self) {
        let mut toasts = self.inner.toasts.lock().unwrap();
        for entry in toasts.drain(..) {
            if let Some(expiry) = entry.expiry {
                expiry.abort();
            }
        }
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        // Last handle gone; stop any timers still counting down.
        if let Ok(toasts) = self.toasts.get_mut() {
            for entry in toasts.iter() {
                if let Some(expiry) = &entry.expiry {
                    expiry.abort();
                }
            }
        }
    }
}

/// Timer-side removal. The weak upgrade fails once the queue itself has
/// been dropped, which turns a late timer into a no-op.
fn expire(weak: Weak<Inner>, id: u64) {
    if let Some(inner) = weak.upgrade() {
        let mut toasts = inner.toasts.lock().unwrap();
        if let Some(index) = toasts.iter().position(|entry| entry.toast.id == id) {
            toasts.remove(index);
        }
    }
}
