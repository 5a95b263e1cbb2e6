//! Bounded FIFO of outbound frames awaiting an open connection.

use std::collections::VecDeque;

use super::Frame;

/// What to do when a frame arrives at a full queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest queued frame to make room
    #[default]
    DropOldest,
    /// Refuse the new frame
    Reject,
}

/// Result of a successful enqueue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enqueued {
    Queued,
    /// Queued after evicting the contained frame
    Evicted(Frame),
}

/// Bounded outbound queue
#[derive(Debug)]
pub struct OutboundQueue {
    frames: VecDeque<Frame>,
    capacity: usize,
    policy: OverflowPolicy,
}

impl OutboundQueue {
    /// Create an empty queue. A zero capacity is raised to one.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            frames: VecDeque::with_capacity(capacity.min(64)),
            capacity,
            policy,
        }
    }

    /// Append a frame, applying the overflow policy when full.
    ///
    /// # Errors
    ///
    /// Under `OverflowPolicy::Reject`, returns the frame back when the queue is full.
    pub fn push(&mut self, frame: Frame) -> Result<Enqueued, Frame> {
        if self.frames.len() < self.capacity {
            self.frames.push_back(frame);
            return Ok(Enqueued::Queued);
        }

        match self.policy {
            OverflowPolicy::Reject => Err(frame),
            OverflowPolicy::DropOldest => {
                let evicted = self.frames.pop_front();
                self.frames.push_back(frame);
                Ok(evicted.map_or(Enqueued::Queued, Enqueued::Evicted))
            }
        }
    }

    /// Remove and return every queued frame in FIFO order.
    pub fn drain(&mut self) -> Vec<Frame> {
        self.frames.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
