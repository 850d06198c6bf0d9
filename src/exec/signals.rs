// src/exec/signals.rs

//! Signal listener used by the supervisor.
//!
//! One Tokio task per signal kind waits on the OS signal stream and pushes
//! the signal onto an unbounded channel. The supervisor's wait loop selects
//! over that channel and the child's exit, so no work happens in signal
//! context.

use nix::sys::signal::Signal;
use tokio::signal::unix::{SignalKind, signal};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::errors::Result;

/// Signals re-delivered to the running task.
///
/// Slurm sends SIGTERM on cancel/timeout, SIGCONT on resume after suspend,
/// and USR1/USR2 when `--signal` is used.
pub const FORWARDED_SIGNALS: [Signal; 5] = [
    Signal::SIGTERM,
    Signal::SIGINT,
    Signal::SIGCONT,
    Signal::SIGUSR1,
    Signal::SIGUSR2,
];

pub struct SignalListener {
    rx: mpsc::UnboundedReceiver<Signal>,
    listeners: Vec<JoinHandle<()>>,
}

impl SignalListener {
    /// Register handlers for `signals` and start listening.
    ///
    /// From this point on the default action of each signal (e.g. terminate
    /// on SIGTERM) no longer applies to this process.
    pub fn install(signals: &[Signal]) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut listeners = Vec::with_capacity(signals.len());

        for &sig in signals {
            let mut stream = signal(SignalKind::from_raw(sig as i32))?;
            let tx = tx.clone();
            listeners.push(tokio::spawn(async move {
                while stream.recv().await.is_some() {
                    debug!(signal = %sig, "signal received");
                    if tx.send(sig).is_err() {
                        break;
                    }
                }
            }));
        }

        Ok(Self { rx, listeners })
    }

    /// Next received signal, or `None` once every listener has stopped.
    pub async fn recv(&mut self) -> Option<Signal> {
        self.rx.recv().await
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        for handle in &self.listeners {
            handle.abort();
        }
    }
}
