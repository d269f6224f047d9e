//! network_health - health endpoint for node network configuration.
//!
//! Answers `GET /healthz` with the outcome of a fixed set of checks:
//!
//! - **flannel mode**: the bridge and flannel interfaces exist and carry the
//!   addresses derived from the flannel env file
//! - **kvm mode**: the guest VM answers ICMP echo, its node agent health port
//!   and optionally the Kubernetes API port
//!
//! Each request runs the checks afresh; nothing is cached between requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use network_health::config::Config;
//! use network_health::health::HealthChecker;
//! use network_health::server::Server;
//!
//! let config = Config::from_env()?;
//! let checker = HealthChecker::from_mode(&config.mode, table, echo, http)?;
//! let server = Server::new(checker, config.server.health_timeout, "network-health");
//! let listener = TcpListener::bind(config.server.listen_addr).await?;
//! server.serve(listener).await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars) with optional "-dirty" suffix
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

/// Full version string: "0.1.0 (abc12345)" or "0.1.0 (abc12345-dirty)"
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_VERSION"), ")");

pub mod config;
pub mod error;
pub mod flannel;
pub mod health;
pub mod logging;
pub mod probe;
pub mod server;

pub use config::Config;
pub use error::Error;
pub use health::HealthChecker;
pub use server::Server;
