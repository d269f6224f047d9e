//! Network targets configuration.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use super::parse::Env;
use super::ConfigError;

/// Which node network the service verifies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HealthMode {
    /// Overlay network: bridge and flannel interfaces must carry the
    /// addresses derived from the flannel env file.
    Flannel {
        bridge_interface: String,
        flannel_interface: String,
        env_file: PathBuf,
    },
    /// Virtual machine: the guest must answer echo and HTTP probes.
    Kvm { guest_ip: Ipv4Addr, check_api: bool },
}

impl HealthMode {
    pub(crate) fn load<F>(env: &Env<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = env.or("HEALTH_MODE", "flannel").to_lowercase();

        match mode.as_str() {
            "flannel" => Ok(Self::Flannel {
                bridge_interface: env.required("NETWORK_BRIDGE_NAME")?,
                flannel_interface: env.required("NETWORK_FLANNEL_DEVICE")?,
                env_file: PathBuf::from(env.required("NETWORK_ENV_FILE_PATH")?),
            }),
            "kvm" => Ok(Self::Kvm {
                guest_ip: env.parse_required("GUEST_IP")?,
                check_api: env.bool("CHECK_API", false),
            }),
            other => Err(ConfigError::Invalid {
                key: "HEALTH_MODE".into(),
                message: format!("unknown mode '{}', expected: flannel, kvm", other),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Flannel { .. } => "flannel",
            Self::Kvm { .. } => "kvm",
        }
    }
}
