//! `suture probe` — send one request through the decorated transport.
//!
//! Builds a [`RestConfig`] from the config file and flags, installs the
//! header transport on it, builds the client transport the way the
//! Kubernetes client would, and issues a single request with a timeout.

use std::time::{Duration, Instant};

use http::{Method, Request};
use http_body_util::BodyExt;
use tower::{ServiceBuilder, ServiceExt};
use tower_http::trace::TraceLayer;

use crate::cli::ProbeArgs;
use crate::error::SutureError;
use crate::rest::{self, RestConfig};
use crate::transport::{empty, full, IdSource, StaticHeaders};

pub async fn execute(args: ProbeArgs) -> Result<(), SutureError> {
    let config = super::resolve_transport_config(&args.transport).await?;

    let mut rest_config = RestConfig::new(config.host.clone().unwrap_or_default());
    rest::wrap_rest_config_with_headers(
        Some(&mut rest_config),
        StaticHeaders::from(&config.headers),
        IdSource::default(),
    );

    let url = rest_config.resolve(&args.target)?;
    let method: Method = args
        .method
        .to_uppercase()
        .parse()
        .map_err(|e: http::method::InvalidMethod| SutureError::HttpRequest {
            source: Box::new(e),
        })?;
    let body = args.data.map_or_else(empty, full);

    let req = Request::builder()
        .method(method.clone())
        .uri(url.as_str())
        .body(body)
        .map_err(|e| SutureError::HttpRequest {
            source: Box::new(e),
        })?;

    let transport = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .service(rest_config.transport());

    let timeout = Duration::from_millis(args.timeout.unwrap_or(config.timeout));
    let start = Instant::now();
    let response = tokio::time::timeout(timeout, transport.oneshot(req))
        .await
        .map_err(|_| SutureError::Timeout(timeout))?
        .map_err(|source| SutureError::HttpRequest { source })?;

    let status = response.status();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|source| SutureError::HttpRequest { source })?
        .to_bytes();

    tracing::info!(
        method = %method,
        url = %url,
        status = status.as_u16(),
        latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "probe completed"
    );

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    println!("{method} {url} \u{2192} {status}");
    if !body.is_empty() {
        println!("{}", String::from_utf8_lossy(&body));
    }
    Ok(())
}
