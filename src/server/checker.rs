//! Named probes evaluated by the liveness endpoint
//!
//! A checker is anything implementing [`Checker`]. Two implementations ship
//! with the crate:
//! - [`FnChecker`] - wraps a plain closure, built with [`from_fn`]
//! - [`TcpChecker`] - pings a dependency by opening a TCP connection

use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;

/// A named, idempotent probe
///
/// Probes run while the registry lock is held, so they must be fast and
/// must not wait on I/O without a bound.
#[async_trait]
pub trait Checker: Send + Sync {
    /// Name used when reporting a failure
    fn name(&self) -> &str;

    /// Run the probe once
    async fn check(&self) -> anyhow::Result<()>;
}

/// Checker backed by a synchronous closure
pub struct FnChecker<F> {
    name: String,
    check: F,
}

impl<F> FnChecker<F>
where
    F: Fn() -> anyhow::Result<()> + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

#[async_trait]
impl<F> Checker for FnChecker<F>
where
    F: Fn() -> anyhow::Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> anyhow::Result<()> {
        (self.check)()
    }
}

/// Build a [`FnChecker`] from a name and a closure
///
/// ```
/// let checker = probe_server::from_fn("simple", || Ok(()));
/// # use probe_server::Checker;
/// assert_eq!(checker.name(), "simple");
/// ```
pub fn from_fn<F>(name: impl Into<String>, check: F) -> FnChecker<F>
where
    F: Fn() -> anyhow::Result<()> + Send + Sync,
{
    FnChecker::new(name, check)
}

/// Default connect timeout for [`TcpChecker`]
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Dependency ping: passes when a TCP connection can be opened
pub struct TcpChecker {
    name: String,
    addr: SocketAddr,
    connect_timeout: Duration,
}

impl TcpChecker {
    pub fn new(name: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            addr,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Override the connect timeout (default 1s)
    pub fn with_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

#[async_trait]
impl Checker for TcpChecker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn check(&self) -> anyhow::Result<()> {
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(self.addr)).await {
            Ok(Ok(_stream)) => Ok(()),
            Ok(Err(e)) => Err(anyhow::anyhow!("connect to {} failed: {}", self.addr, e)),
            Err(_) => Err(anyhow::anyhow!(
                "connect to {} timed out after {:?}",
                self.addr,
                self.connect_timeout
            )),
        }
    }
}
