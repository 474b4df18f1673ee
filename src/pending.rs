use std::collections::VecDeque;

use wire::{Channel, Message};

/// Capped rather than unbounded so a misbehaving caller fails fast instead
/// of growing memory without limit; see DESIGN.md.
pub const MAX_PENDING: usize = 1024;

/// Raised when a 1025th send is queued before the handshake completes.
#[derive(Debug)]
pub struct QueueOverflow;

/// Sends issued before the handshake completes (or mid-drain, to preserve
/// FIFO order) wait here. The queue owns its entries until
/// [`PendingQueue::pop_front`] hands them back for emission.
#[derive(Default)]
pub struct PendingQueue {
    entries: VecDeque<(Channel, Message)>,
}

impl PendingQueue {
    pub fn new() -> Self {
        PendingQueue { entries: VecDeque::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn push(&mut self, channel: Channel, message: Message) -> Result<(), QueueOverflow> {
        if self.entries.len() >= MAX_PENDING {
            return Err(QueueOverflow);
        }
        self.entries.push_back((channel, message));
        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<(Channel, Message)> {
        self.entries.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::{Close, Message};

    fn entry(n: u64) -> (Channel, Message) {
        (Channel(n), Message::Close(Close { discovery_key: None }))
    }

    #[test]
    fn drains_in_fifo_order() {
        let mut queue = PendingQueue::new();
        for i in 0..3 {
            queue.push(entry(i).0, entry(i).1).unwrap();
        }
        assert_eq!(queue.pop_front().unwrap().0, Channel(0));
        assert_eq!(queue.pop_front().unwrap().0, Channel(1));
        assert_eq!(queue.pop_front().unwrap().0, Channel(2));
        assert!(queue.pop_front().is_none());
    }

    #[test]
    fn rejects_the_1025th_entry() {
        let mut queue = PendingQueue::new();
        for i in 0..MAX_PENDING as u64 {
            queue.push(entry(i).0, entry(i).1).unwrap();
        }
        assert!(queue.push(entry(0).0, entry(0).1).is_err());
    }
}
