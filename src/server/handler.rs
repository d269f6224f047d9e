//! Request routing for `/healthz` and `/version`.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use http_body_util::Full;
use hyper::{Method, Request, Response, StatusCode};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::VersionInfo;
use crate::config::HealthTimeout;
use crate::health::{AggregatedVerdict, HealthChecker};
use crate::logging::{log_access, AccessRecord};

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

/// Shared, read-only state of every request.
pub(crate) struct HandlerContext {
    pub checker: Arc<HealthChecker>,
    pub version: VersionInfo,
    pub health_timeout: HealthTimeout,
    pub service_name: String,
    pub access_log: bool,
}

pub(crate) async fn handle_request<B>(
    req: Request<B>,
    ctx: Arc<HandlerContext>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = route(&method, &path, &ctx).await;

    if ctx.access_log {
        let ip = remote_addr.ip().to_string();
        log_access(
            &ctx.service_name,
            &AccessRecord {
                ip: &ip,
                method: method.as_str(),
                path: &path,
                status: response.status().as_u16(),
                bytes: body_len(&response),
                duration: start.elapsed(),
            },
        );
    }

    Ok(response)
}

async fn route(method: &Method, path: &str, ctx: &HandlerContext) -> Response<Full<Bytes>> {
    match (path, method) {
        ("/healthz", &Method::GET) => healthz(ctx).await,
        ("/version", &Method::GET) => json_response(&ctx.version),
        ("/healthz", _) | ("/version", _) => {
            let mut response = text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET"));
            response
        }
        _ => text_response(StatusCode::NOT_FOUND, "Not Found"),
    }
}

/// Run every check once and serialize the outcomes.
///
/// Always answers 200; the health state is carried by the body.
async fn healthz(ctx: &HandlerContext) -> Response<Full<Bytes>> {
    let verdict = run_checks(&ctx.checker, &ctx.health_timeout).await;
    debug!(failed = verdict.failed, message = %verdict.message, "Health checks evaluated");
    json_response(&verdict.outcomes)
}

async fn run_checks(checker: &HealthChecker, timeout: &HealthTimeout) -> AggregatedVerdict {
    let cancel = CancellationToken::new();
    // Cancels in-flight probes when the request future is dropped
    let _guard = cancel.clone().drop_guard();

    let run = checker.run_all(&cancel);
    tokio::pin!(run);

    match timeout.as_duration() {
        Some(deadline) => tokio::select! {
            verdict = &mut run => verdict,
            _ = tokio::time::sleep(deadline) => {
                warn!(timeout_ms = deadline.as_millis() as u64, "Health check deadline exceeded");
                cancel.cancel();
                run.await
            }
        },
        None => run.await,
    }
}

fn json_response<T: serde::Serialize + ?Sized>(value: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(value) {
        Ok(body) => {
            let mut response = Response::new(Full::new(Bytes::from(body)));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
            response
        }
        Err(e) => {
            error!(error = %e, "Failed to serialize response");
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT));
    response
}

fn body_len(response: &Response<Full<Bytes>>) -> u64 {
    use hyper::body::Body;
    response.body().size_hint().exact().unwrap_or(0)
}
