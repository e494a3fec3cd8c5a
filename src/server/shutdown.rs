//! One-shot stop channel for the health listener
//!
//! [`DebugServer`](super::DebugServer) uses one channel internally to stop
//! axum's graceful serve loop, and `run_until` waits on a second one owned by
//! the process. The binary fires that one from [`wait_for_signal`].

use tokio::sync::watch;
use tracing::info;

/// Resolves once the paired [`ShutdownTrigger`] fires or is dropped
pub struct ShutdownSignal {
    receiver: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub async fn wait(mut self) {
        // An Err means the trigger was dropped; nobody can fire it anymore
        let _ = self.receiver.wait_for(|stopped| *stopped).await;
    }
}

/// Firing side of the stop channel
pub struct ShutdownTrigger {
    sender: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Request a stop. Firing twice is a no-op.
    pub fn trigger(&self) {
        if !self.sender.send_replace(true) {
            info!("Stop requested");
        }
    }
}

pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (sender, receiver) = watch::channel(false);
    (ShutdownTrigger { sender }, ShutdownSignal { receiver })
}

/// Resolve on SIGINT / Ctrl+C; no other signal is handled
///
/// # Panics
/// Panics if the interrupt handler cannot be installed.
pub async fn wait_for_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Cannot install interrupt handler");
        panic!("Cannot install interrupt handler: {}", e);
    }
    info!("Received interrupt");
}
