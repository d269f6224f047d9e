//! Build information served on `/version`.

use serde::Serialize;

use crate::{BUILD_VERSION, PKG_VERSION};

/// Build and runtime description of this binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub description: String,
    pub git_commit: String,
    pub name: String,
    pub os_arch: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rust_version: Option<String>,
    pub source: String,
    pub version: String,
}

impl VersionInfo {
    pub fn new(name: impl Into<String>) -> Self {
        let source = match env!("CARGO_PKG_REPOSITORY") {
            "" => "n/a",
            repo => repo,
        };

        Self {
            description: env!("CARGO_PKG_DESCRIPTION").to_string(),
            git_commit: BUILD_VERSION.to_string(),
            name: name.into(),
            os_arch: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
            rust_version: option_env!("RUSTC_VERSION").map(str::to_string),
            source: source.to_string(),
            version: PKG_VERSION.to_string(),
        }
    }
}
