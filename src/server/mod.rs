//! HTTP endpoint serving `/healthz` and `/version`.
//!
//! HTTP/1.1 only, one task per connection. Shutdown is signalled through a
//! `watch` channel: the accept loop stops and open connections finish their
//! in-flight request before closing.

mod handler;
mod version;

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::config::HealthTimeout;
use crate::error::Error;
use crate::health::HealthChecker;

use handler::{handle_request, HandlerContext};
pub use version::VersionInfo;

/// Health endpoint server.
pub struct Server {
    ctx: Arc<HandlerContext>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl Server {
    pub fn new(
        checker: HealthChecker,
        health_timeout: HealthTimeout,
        service_name: impl Into<String>,
    ) -> Self {
        let service_name = service_name.into();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            ctx: Arc::new(HandlerContext {
                checker: Arc::new(checker),
                version: VersionInfo::new(service_name.clone()),
                health_timeout,
                service_name,
                access_log: true,
            }),
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Disable the per-request access log line.
    pub fn without_access_log(mut self) -> Self {
        if let Some(ctx) = Arc::get_mut(&mut self.ctx) {
            ctx.access_log = false;
        }
        self
    }

    /// Serve on an already bound listener until shutdown is triggered.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), Error> {
        let local_addr = listener.local_addr()?;
        info!(
            "Listening on http://{} ({} checks)",
            local_addr,
            self.ctx.checker.len()
        );

        let mut shutdown_rx = self.shutdown_rx.clone();
        if *shutdown_rx.borrow() {
            return Ok(());
        }

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, remote_addr) = match result {
                        Ok(conn) => conn,
                        Err(e) => {
                            error!("Accept error: {}", e);
                            continue;
                        }
                    };

                    let _ = stream.set_nodelay(true);
                    let ctx = Arc::clone(&self.ctx);
                    let conn_shutdown = self.shutdown_rx.clone();

                    tokio::spawn(serve_connection(stream, remote_addr, ctx, conn_shutdown));
                }
                _ = shutdown_rx.changed() => {
                    debug!("Received shutdown signal, stopping accept loop");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Signal the accept loop and open connections to stop.
    pub fn trigger_shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

async fn serve_connection(
    stream: TcpStream,
    remote_addr: SocketAddr,
    ctx: Arc<HandlerContext>,
    mut shutdown: watch::Receiver<bool>,
) {
    let service = service_fn(move |req| handle_request(req, Arc::clone(&ctx), remote_addr));
    let conn = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => {
            if let Err(e) = result {
                debug!(%remote_addr, "Connection error: {}", e);
            }
        }
        _ = shutdown.changed() => {
            conn.as_mut().graceful_shutdown();
            if let Err(e) = conn.await {
                debug!(%remote_addr, "Connection error during shutdown: {}", e);
            }
        }
    }
}
