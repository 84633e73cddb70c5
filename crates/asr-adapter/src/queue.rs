use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, Notify};

use crate::event::AsrEvent;

/// Capacity of the bounded channel between a vendor callback/socket and the
/// orchestrator's receive loop. Sized for a few seconds of updates at the
/// vendor's typical cadence; overflow drops the oldest queued event rather
/// than blocking the vendor's delivery thread.
pub const CHANNEL_CAPACITY: usize = 64;

struct Inner {
    queue: Mutex<VecDeque<AsrEvent>>,
    notify: Notify,
    closed: std::sync::atomic::AtomicBool,
    dropped: AtomicU64,
}

/// The publishing half, held by a vendor adapter's callback or socket-read
/// task.
#[derive(Clone)]
pub struct EventSender {
    inner: Arc<Inner>,
}

/// The consuming half, held by the orchestrator's receive loop.
pub struct EventReceiver {
    inner: Arc<Inner>,
}

/// Creates a bounded, drop-oldest channel of the standard ASR adapter
/// capacity.
pub fn channel() -> (EventSender, EventReceiver) {
    let inner = Arc::new(Inner {
        queue: Mutex::new(VecDeque::with_capacity(CHANNEL_CAPACITY)),
        notify: Notify::new(),
        closed: std::sync::atomic::AtomicBool::new(false),
        dropped: AtomicU64::new(0),
    });
    (
        EventSender {
            inner: inner.clone(),
        },
        EventReceiver { inner },
    )
}

impl EventSender {
    /// Pushes an event. If the queue is at capacity, drops the oldest
    /// queued event and increments the drop counter — never blocks.
    pub async fn push(&self, event: AsrEvent) {
        let mut queue = self.inner.queue.lock().await;
        if queue.len() >= CHANNEL_CAPACITY {
            queue.pop_front();
            let total = self.inner.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(dropped_total = total, "asr_event_channel_overflow");
        }
        queue.push_back(event);
        drop(queue);
        self.inner.notify.notify_one();
    }

    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.notify.notify_one();
    }

    pub fn dropped_count(&self) -> u64 {
        self.inner.dropped.load(Ordering::Relaxed)
    }
}

impl EventReceiver {
    /// Waits for the next event. Returns `None` once the sender is closed
    /// and the queue has drained.
    pub async fn recv(&mut self) -> Option<AsrEvent> {
        loop {
            {
                let mut queue = self.inner.queue.lock().await;
                if let Some(event) = queue.pop_front() {
                    return Some(event);
                }
                if self.inner.closed.load(Ordering::SeqCst) {
                    return None;
                }
            }
            self.inner.notify.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{AsrWord, EventKind};

    fn dummy(n: u32) -> AsrEvent {
        AsrEvent {
            speaker_id: "spk".into(),
            words: vec![AsrWord {
                text: n.to_string(),
                is_final: false,
            }],
            kind: EventKind::Update,
        }
    }

    #[tokio::test]
    async fn drops_oldest_on_overflow() {
        let (tx, mut rx) = channel();
        for i in 0..(CHANNEL_CAPACITY as u32 + 5) {
            tx.push(dummy(i)).await;
        }
        assert_eq!(tx.dropped_count(), 5);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.words[0].text, "5");
    }

    #[tokio::test]
    async fn recv_returns_none_after_close_and_drain() {
        let (tx, mut rx) = channel();
        tx.push(dummy(1)).await;
        tx.close();

        assert!(rx.recv().await.is_some());
        assert!(rx.recv().await.is_none());
    }
}
