//! Listener lifecycle for the health server
//!
//! ```text
//! Created → Listening → ShuttingDown → Stopped
//!    └─ bind failure → Failed
//! ```
//!
//! Readiness is set true only once the listener is bound, and is always set
//! false before shutdown starts. `Stopped` and `Failed` are terminal.

use crate::config::{Config, ConfigError};
use crate::server::health::router;
use crate::server::registry::CheckRegistry;
use crate::server::shutdown::{shutdown_channel, ShutdownSignal, ShutdownTrigger};
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Listening,
    ShuttingDown,
    Stopped,
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Created => "created",
            LifecycleState::Listening => "listening",
            LifecycleState::ShuttingDown => "shutting down",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Errors surfaced to the process supervisor
///
/// All variants except `InvalidState` are fatal for the process.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("failed to bind health server on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("health server did not stop within {timeout:?}")]
    ShutdownTimeout { timeout: Duration },

    #[error("health server stopped unexpectedly: {0}")]
    Serve(#[from] io::Error),

    #[error("health server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("cannot {op} health server while {state}")]
    InvalidState {
        op: &'static str,
        state: LifecycleState,
    },
}

type ServeResult = Result<io::Result<()>, tokio::task::JoinError>;

/// Owns the health listener and drives readiness through its lifecycle
pub struct DebugServer {
    addr: SocketAddr,
    shutdown_timeout: Duration,
    registry: CheckRegistry,
    state: LifecycleState,
    local_addr: Option<SocketAddr>,
    stop: Option<ShutdownTrigger>,
    task: Option<JoinHandle<io::Result<()>>>,
}

impl DebugServer {
    pub fn new(addr: SocketAddr, shutdown_timeout: Duration, registry: CheckRegistry) -> Self {
        Self {
            addr,
            shutdown_timeout,
            registry,
            state: LifecycleState::Created,
            local_addr: None,
            stop: None,
            task: None,
        }
    }

    pub fn from_config(config: &Config, registry: CheckRegistry) -> Result<Self, ConfigError> {
        Ok(Self::new(
            config.socket_addr()?,
            config.shutdown_timeout.into(),
            registry,
        ))
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Address actually bound, once listening
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// Bind the listener and start serving in a background task
    ///
    /// On bind failure readiness is forced false and the server is left in
    /// `Failed`.
    pub async fn start(&mut self) -> Result<SocketAddr, LifecycleError> {
        if self.state != LifecycleState::Created {
            return Err(LifecycleError::InvalidState {
                op: "start",
                state: self.state,
            });
        }

        let listener = match TcpListener::bind(self.addr).await {
            Ok(listener) => listener,
            Err(source) => {
                error!(addr = %self.addr, error = %source, "Failed to bind health server");
                self.state = LifecycleState::Failed;
                self.registry.set_ready(false).await;
                return Err(LifecycleError::Bind {
                    addr: self.addr,
                    source,
                });
            }
        };
        let local_addr = listener.local_addr().unwrap_or(self.addr);

        let (stop, stop_signal) = shutdown_channel();
        let app = router(self.registry.clone());
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(stop_signal.wait())
                .await
        });

        self.stop = Some(stop);
        self.task = Some(task);
        self.local_addr = Some(local_addr);
        self.state = LifecycleState::Listening;
        // Log after successful bind - server is actually listening
        info!(addr = %local_addr, "Health server listening");

        self.registry.set_ready(true).await;
        Ok(local_addr)
    }

    /// Mark not ready, then stop the listener within the shutdown timeout
    ///
    /// The deadline covers the whole sequence, including waiting for the
    /// registry lock held by an in-flight liveness run. Missing it aborts the
    /// serve task and is reported as [`LifecycleError::ShutdownTimeout`].
    pub async fn shutdown(&mut self) -> Result<(), LifecycleError> {
        if self.state != LifecycleState::Listening {
            return Err(LifecycleError::InvalidState {
                op: "shut down",
                state: self.state,
            });
        }

        info!(timeout = ?self.shutdown_timeout, "Shutting down health server");
        let deadline = Instant::now() + self.shutdown_timeout;
        self.state = LifecycleState::ShuttingDown;

        let cleared = tokio::time::timeout_at(deadline, self.registry.set_ready(false)).await;
        if cleared.is_err() {
            // A checker still holds the lock; clear readiness once it lets go
            let registry = self.registry.clone();
            tokio::spawn(async move { registry.set_ready(false).await });
            if let Some(task) = self.task.take() {
                task.abort();
            }
            self.stop = None;
            self.state = LifecycleState::Stopped;
            error!(
                timeout = ?self.shutdown_timeout,
                "Readiness not cleared before shutdown deadline"
            );
            return Err(LifecycleError::ShutdownTimeout {
                timeout: self.shutdown_timeout,
            });
        }

        if let Some(stop) = self.stop.take() {
            stop.trigger();
        }
        let Some(task) = self.task.take() else {
            self.state = LifecycleState::Stopped;
            return Ok(());
        };

        let result = stop_by(task, deadline, self.shutdown_timeout).await;
        self.state = LifecycleState::Stopped;
        if result.is_ok() {
            info!("Health server shutdown graceful");
        }
        result
    }

    /// Start, wait for `signal`, then shut down
    ///
    /// If the serve task ends on its own before the signal arrives,
    /// readiness is cleared and the failure is returned.
    pub async fn run_until(&mut self, signal: ShutdownSignal) -> Result<(), LifecycleError> {
        self.start().await?;

        let early_exit = match self.task.as_mut() {
            Some(task) => tokio::select! {
                _ = signal.wait() => None,
                served = task => Some(served),
            },
            None => {
                signal.wait().await;
                None
            }
        };

        if let Some(served) = early_exit {
            warn!("Health server exited before shutdown was requested");
            self.task = None;
            self.stop = None;
            self.state = LifecycleState::Stopped;
            self.registry.set_ready(false).await;
            serve_outcome(served)?;
            return Err(LifecycleError::Serve(io::Error::other(
                "listener exited without error",
            )));
        }

        self.shutdown().await
    }
}

/// Wait for the serve task to finish by `deadline`, aborting it otherwise
///
/// `timeout` is the configured budget, reported on expiry.
pub(crate) async fn stop_by(
    mut task: JoinHandle<io::Result<()>>,
    deadline: Instant,
    timeout: Duration,
) -> Result<(), LifecycleError> {
    match tokio::time::timeout_at(deadline, &mut task).await {
        Ok(served) => serve_outcome(served),
        Err(_) => {
            task.abort();
            error!(timeout = ?timeout, "Health server shutdown timed out");
            Err(LifecycleError::ShutdownTimeout { timeout })
        }
    }
}

fn serve_outcome(served: ServeResult) -> Result<(), LifecycleError> {
    match served {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(LifecycleError::Serve(e)),
        Err(e) => Err(LifecycleError::Join(e)),
    }
}
