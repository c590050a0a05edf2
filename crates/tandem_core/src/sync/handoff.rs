//! # Handoff Signals
//!
//! A counting signal built on an unbounded `crossbeam-channel` of unit
//! tokens: `release` sends a token, `acquire` blocks until one arrives.
//! When the releasing side is dropped the channel disconnects and
//! `acquire` stops blocking, so a dead peer never hangs the survivor.

use crossbeam_channel::{Receiver, Sender};

/// The peer holding the other half is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PeerGone;

/// Releasing half of a handoff signal.
#[derive(Debug)]
pub(crate) struct Release {
    tx: Sender<()>,
}

/// Acquiring half of a handoff signal.
#[derive(Debug)]
pub(crate) struct Acquire {
    rx: Receiver<()>,
}

/// Creates a signal holding `initial` tokens.
pub(crate) fn signal(initial: usize) -> (Release, Acquire) {
    let (tx, rx) = crossbeam_channel::unbounded();
    for _ in 0..initial {
        // The receiver is alive, an unbounded send cannot fail here.
        let _ = tx.send(());
    }
    (Release { tx }, Acquire { rx })
}

impl Release {
    /// Adds one token.
    pub(crate) fn release(&self) -> Result<(), PeerGone> {
        self.tx.send(()).map_err(|_| PeerGone)
    }
}

impl Acquire {
    /// Takes one token, blocking until one is available.
    ///
    /// Tokens released before the peer was dropped are still delivered.
    pub(crate) fn acquire(&self) -> Result<(), PeerGone> {
        self.rx.recv().map_err(|_| PeerGone)
    }

    /// Takes one token if one is available right now.
    #[cfg(test)]
    pub(crate) fn try_acquire(&self) -> bool {
        self.rx.try_recv().is_ok()
    }
}
