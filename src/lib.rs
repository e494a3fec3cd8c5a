//! Readiness and liveness probes for long-running services
//!
//! - `server` - check registry, health endpoints and listener lifecycle
//! - `config` - environment-sourced settings

pub mod config;
pub mod server;

pub use config::Config;
pub use server::{
    from_fn, CheckError, CheckRegistry, Checker, DebugServer, HealthEndpoint, LifecycleError,
    LifecycleState, TcpChecker,
};
