//! Integration tests for network_health
//!
//! Each test starts the HTTP server in-process on an ephemeral port with
//! injected interface tables and probers, then talks to it over HTTP.
//! No root privileges or real network configuration are needed.

mod helpers;

mod flannel_mode;
mod healthz;
mod kvm_mode;
mod version;
