//! Bounded in-proc channels for framed message bytes.
//!
//! The network I/O thread and the simulation thread only ever talk through
//! these queues (one per direction). `std::sync::mpsc::sync_channel` supplies
//! the bound; senders drop messages rather than block the producing thread.

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

#[derive(Clone)]
pub struct Tx(SyncSender<Vec<u8>>);
pub struct Rx(Receiver<Vec<u8>>);

/// Create a bounded sender/receiver pair.
#[must_use]
pub fn channel_bounded(capacity: usize) -> (Tx, Rx) {
    let (s, r) = mpsc::sync_channel::<Vec<u8>>(capacity);
    (Tx(s), Rx(r))
}

impl Tx {
    /// Non-blocking send; returns false if the queue is full or the receiver
    /// is gone. Callers decide whether a drop is a warning or fatal.
    #[must_use]
    pub fn try_send(&self, bytes: Vec<u8>) -> bool {
        match self.0.try_send(bytes) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => false,
        }
    }
}

impl Rx {
    /// Non-blocking receive of a single message.
    #[must_use]
    pub fn try_recv(&self) -> Option<Vec<u8>> {
        self.0.try_recv().ok()
    }

    /// Drain all currently queued messages.
    #[must_use]
    pub fn drain(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(b) = self.try_recv() {
            out.push(b);
        }
        out
    }
}
