//! Shared readiness flag and ordered checker list

use crate::server::checker::Checker;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// A registered checker reported a failure
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("checker {name} failed: {source}")]
    Failed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl CheckError {
    /// Name of the checker that failed
    pub fn checker_name(&self) -> &str {
        match self {
            CheckError::Failed { name, .. } => name,
        }
    }
}

#[derive(Default)]
struct RegistryInner {
    ready: bool,
    checkers: Vec<Arc<dyn Checker>>,
}

/// Readiness flag plus the checkers backing the liveness probe
///
/// Every read and write goes through one async mutex, so concurrent
/// requests are serialized. Clones share the same state.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl CheckRegistry {
    /// Create an empty registry (initially not ready)
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a checker; duplicates by name are kept and both run
    pub async fn add_checker<C>(&self, checker: C)
    where
        C: Checker + 'static,
    {
        debug!(checker = checker.name(), "Adding checker");
        self.inner.lock().await.checkers.push(Arc::new(checker));
    }

    /// Append already shared checkers in iteration order
    pub async fn add_checkers<I>(&self, checkers: I)
    where
        I: IntoIterator<Item = Arc<dyn Checker>>,
    {
        let mut inner = self.inner.lock().await;
        for checker in checkers {
            debug!(checker = checker.name(), "Adding checker");
            inner.checkers.push(checker);
        }
    }

    pub async fn set_ready(&self, ready: bool) {
        let mut inner = self.inner.lock().await;
        inner.ready = ready;
        if ready {
            info!("Server is ready");
        } else {
            info!("Server is not ready");
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.inner.lock().await.ready
    }

    /// Number of registered checkers
    pub async fn len(&self) -> usize {
        self.inner.lock().await.checkers.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Run every checker in insertion order, stopping at the first failure
    ///
    /// The lock is held for the whole run.
    pub async fn run_all_checks(&self) -> Result<(), CheckError> {
        let inner = self.inner.lock().await;
        for checker in &inner.checkers {
            if let Err(source) = checker.check().await {
                error!(checker = checker.name(), error = %source, "Checker failed");
                return Err(CheckError::Failed {
                    name: checker.name().to_string(),
                    source,
                });
            }
        }
        Ok(())
    }
}
