use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{error, info, warn};

use network_health::config::{Config, HealthMode, LoggingConfig};
use network_health::probe::{running_as_root, HttpEndpointProber, IcmpEchoProber, SystemInterfaces};
use network_health::{logging, Error, HealthChecker, Server, VERSION};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let logging_config = LoggingConfig::from_env()?;
    logging::init(&logging_config);

    info!("Starting network_health {}", VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main()).map_err(|e| {
        error!(error = %e, "network_health stopped with error");
        e.into()
    })
}

async fn async_main() -> Result<(), Error> {
    let config = Config::from_env()?;
    config.log_summary();

    if matches!(config.mode, HealthMode::Kvm { .. }) && !running_as_root() {
        warn!("Not running as root: raw ICMP sockets are unavailable and the echo step will fail");
    }

    let checker = HealthChecker::from_mode(
        &config.mode,
        Arc::new(SystemInterfaces),
        Arc::new(IcmpEchoProber::new()),
        Arc::new(HttpEndpointProber::new()?),
    )?;
    info!(checks = ?checker.names(), "Health checks registered");

    let listener = TcpListener::bind(config.server.listen_addr).await?;
    let server = Server::new(
        checker,
        config.server.health_timeout.clone(),
        config.logging.service_name.clone(),
    );

    let serve = server.serve(listener);
    tokio::pin!(serve);

    // Handle shutdown gracefully
    tokio::select! {
        result = &mut serve => return result,
        _ = tokio::signal::ctrl_c() => {
            info!("Shutting down...");
            server.trigger_shutdown();
        }
    }

    serve.await
}
