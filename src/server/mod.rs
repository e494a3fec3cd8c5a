//! HTTP server for health endpoints
//!
//! Provides Kubernetes health probes:
//! - `/ready` - Readiness probe (should the service receive traffic)
//! - `/live` - Liveness probe (do all registered checkers pass)
//!
//! Also provides the listener lifecycle and the shutdown channel that
//! drives graceful stop.

mod checker;
mod health;
mod lifecycle;
mod registry;
pub mod shutdown;

pub use checker::{from_fn, Checker, FnChecker, TcpChecker};
pub use health::{router, HealthEndpoint, LivenessResponse, ReadinessResponse};
pub use lifecycle::{DebugServer, LifecycleError, LifecycleState};
pub use registry::{CheckError, CheckRegistry};
pub use shutdown::{shutdown_channel, wait_for_signal, ShutdownSignal, ShutdownTrigger};

#[cfg(test)]
#[path = "checker_test.rs"]
mod checker_tests;

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_tests;

#[cfg(test)]
#[path = "health_test.rs"]
mod health_tests;

#[cfg(test)]
#[path = "lifecycle_test.rs"]
mod lifecycle_tests;

#[cfg(test)]
#[path = "shutdown_test.rs"]
mod shutdown_tests;
