//! Individual network probes.
//!
//! Every probe reports a [`Step`]: either it passed or it failed, each with
//! the diagnostic text for that single attempt. Probes never return errors
//! for an unhealthy network; "could not evaluate" and "evaluated unhealthy"
//! are both a [`Step::Fail`].
//!
//! The I/O behind each probe sits behind a trait so the chain logic can be
//! exercised without raw sockets or a live guest:
//!
//! | Trait | System implementation | Backed by |
//! |-------|-----------------------|-----------|
//! | [`InterfaceTable`] | [`SystemInterfaces`] | `pnet::datalink::interfaces()` |
//! | [`EchoProber`] | [`IcmpEchoProber`] | raw ICMPv4 socket via `pnet::transport` |
//! | [`HttpProber`] | [`HttpEndpointProber`] | `reqwest` without connection pooling |

mod echo;
mod http;
mod interface;
mod reachability;

pub use echo::{running_as_root, EchoError, EchoProber, IcmpEchoProber, ECHO_TIMEOUT};
pub use self::http::{HttpEndpointProber, HttpProber, HTTP_TIMEOUT};
pub use interface::{check_interface, InterfaceTable, SystemInterfaces};
pub use reachability::{ChainStep, ReachabilityProbe, API_PORT, SERVICE_PORT};

/// Result of one probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Pass(String),
    Fail(String),
}

impl Step {
    #[inline]
    pub fn is_fail(&self) -> bool {
        matches!(self, Step::Fail(_))
    }

    #[inline]
    pub fn message(&self) -> &str {
        match self {
            Step::Pass(msg) | Step::Fail(msg) => msg,
        }
    }

    /// Split into `(failed, message)`.
    pub fn into_parts(self) -> (bool, String) {
        match self {
            Step::Pass(msg) => (false, msg),
            Step::Fail(msg) => (true, msg),
        }
    }
}
