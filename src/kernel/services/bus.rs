//! Worker to session handoff.
//!
//! Search pages and suggestion jobs run on the tokio pool and post their
//! outcomes as actions. The session drains them on its own thread and
//! dispatches them in arrival order; `mpsc` keeps each sender's order.

use crate::kernel::Action;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// The session side has been dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusClosed;

impl std::fmt::Display for BusClosed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "kernel bus closed")
    }
}

impl std::error::Error for BusClosed {}

#[derive(Clone)]
pub struct KernelBusSender {
    tx: Sender<Action>,
}

pub struct KernelBusReceiver {
    rx: Receiver<Action>,
    closed: bool,
}

pub fn kernel_bus() -> (KernelBusSender, KernelBusReceiver) {
    let (tx, rx) = mpsc::channel();
    (
        KernelBusSender { tx },
        KernelBusReceiver { rx, closed: false },
    )
}

impl KernelBusSender {
    /// Workers treat `BusClosed` as cancellation.
    pub fn send_action(&self, action: Action) -> Result<(), BusClosed> {
        self.tx.send(action).map_err(|_| BusClosed)
    }
}

impl KernelBusReceiver {
    /// Takes at most `limit` queued actions without blocking.
    pub fn drain(&mut self, limit: usize) -> Vec<Action> {
        let mut actions = Vec::new();
        while actions.len() < limit {
            match self.rx.try_recv() {
                Ok(action) => actions.push(action),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
        actions
    }

    /// Waits up to `timeout` for the next action.
    pub fn next_timeout(&mut self, timeout: Duration) -> Option<Action> {
        if self.closed {
            std::thread::sleep(timeout);
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(action) => Some(action),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    /// Every sender is gone; nothing more will arrive.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}
