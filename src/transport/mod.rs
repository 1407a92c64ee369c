//! Request executors and the boxed types that tie them together.
//!
//! An executor is anything implementing
//! `tower::Service<http::Request<B>>`. Hooks and configuration deal in the
//! type-erased [`BoxTransport`] so that arbitrary layers can be stacked at
//! runtime. [`default_transport`] is the system executor: a
//! connection-pooled hyper client with rustls.
//!
//! The header-injecting decorator lives in [`headers`].

pub mod headers;

use std::time::Duration;

use bytes::Bytes;
use http::{Request, Response};
use http_body_util::{BodyExt, Empty, Full};
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::util::BoxCloneService;
use tower::ServiceExt;

pub use headers::{
    new_headers_transport, new_headers_transport_with, HeaderInjector, HeadersTransport,
    IdSource, StaticHeaders, SutureIdLayer, SUTURE_ID_ENV, SUTURE_ID_HEADER,
};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Request and response body used by boxed transports.
pub type Body = http_body_util::combinators::UnsyncBoxBody<Bytes, BoxError>;

/// Type-erased executor: request in, response or error out.
pub type BoxTransport = BoxCloneService<Request<Body>, Response<Body>, BoxError>;

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, Body>;

/// A body carrying `bytes`. Empty input yields an empty body.
#[must_use]
pub fn full(bytes: impl Into<Bytes>) -> Body {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

#[must_use]
pub fn empty() -> Body {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // With more than one rustls crypto provider compiled in, rustls cannot
    // pick one on its own. Install `ring` explicitly.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

/// Box any compatible executor into a [`BoxTransport`].
pub fn boxed<S, ResBody>(service: S) -> BoxTransport
where
    S: tower::Service<Request<Body>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
    ResBody: http_body::Body<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    BoxCloneService::new(
        service
            .map_response(|response: Response<ResBody>| {
                response.map(|body| {
                    body.map_err(|e| -> BoxError { e.into() })
                        .boxed_unsync()
                })
            })
            .map_err(|e: S::Error| -> BoxError { e.into() }),
    )
}

/// The system executor used when no base executor is supplied.
#[must_use]
pub fn default_transport() -> BoxTransport {
    boxed(build_http_client())
}
