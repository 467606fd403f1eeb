//! Bounded output handoff between the I/O pump and the consumer
//!
//! An ordered FIFO of immutable byte chunks. Under sustained backpressure
//! the oldest chunk is dropped; chunks are never merged, split or
//! reordered. Input in the other direction never goes through this channel,
//! so keystrokes are never subject to the drop policy.

use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tracing::trace;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug)]
struct ChannelState {
    queue: VecDeque<Bytes>,
    closed: bool,
    dropped: u64,
}

/// Shared handle; clone one for the producer and one for the consumer.
/// `recv` assumes a single consumer.
#[derive(Debug, Clone)]
pub struct OutputChannel {
    shared: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<ChannelState>,
    notify: Notify,
    capacity: usize,
}

impl OutputChannel {
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(ChannelState {
                    queue: VecDeque::new(),
                    closed: false,
                    dropped: 0,
                }),
                notify: Notify::new(),
                capacity: capacity.max(1),
            }),
        }
    }

    /// Enqueue a chunk, evicting the oldest when full. No-op after close.
    pub fn push(&self, chunk: Bytes) {
        {
            let mut state = self.shared.state.lock().unwrap();
            if state.closed {
                return;
            }
            if state.queue.len() >= self.shared.capacity {
                state.queue.pop_front();
                state.dropped += 1;
                trace!(dropped = state.dropped, "output channel full, dropping oldest chunk");
            }
            state.queue.push_back(chunk);
        }
        self.shared.notify.notify_one();
    }

    /// Receive the next chunk in arrival order; `None` once the channel is
    /// closed and drained.
    pub async fn recv(&self) -> Option<Bytes> {
        loop {
            let notified = self.shared.notify.notified();
            {
                let mut state = self.shared.state.lock().unwrap();
                if let Some(chunk) = state.queue.pop_front() {
                    return Some(chunk);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Non-blocking receive.
    pub fn try_recv(&self) -> Option<Bytes> {
        self.shared.state.lock().unwrap().queue.pop_front()
    }

    /// Close the channel; queued chunks remain receivable.
    pub fn close(&self) {
        self.shared.state.lock().unwrap().closed = true;
        self.shared.notify.notify_one();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().unwrap().closed
    }

    /// Chunks discarded so far under the drop-oldest policy.
    pub fn dropped_chunks(&self) -> u64 {
        self.shared.state.lock().unwrap().dropped
    }
}
