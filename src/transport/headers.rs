//! Header-injecting executor.
//!
//! [`HeadersTransport`] wraps any `tower::Service<http::Request<B>>` and,
//! before delegating each call, stamps the request with:
//!
//! - every caller-supplied static header ([`StaticHeaders`]),
//! - the `Suture_ID` identifier header, read fresh from the environment on
//!   every call through an [`IdSource`] (an unset variable yields an empty
//!   value, never a missing header),
//! - `Content-Type` and `Accept` set to `application/json` whenever the
//!   request carries a non-empty body.
//!
//! Existing values with the same name are overwritten. The response future,
//! response and error of the inner service are returned untouched.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower::{Layer, Service};

use super::{default_transport, BoxTransport};

/// Identifier header name. Header names are case-insensitive, so this is
/// `Suture_ID` on the wire as far as any HTTP peer is concerned.
pub const SUTURE_ID_HEADER: &str = "suture_id";

/// Environment variable holding the identifier value.
pub const SUTURE_ID_ENV: &str = "SUTURE_ID";

/// Static headers set on every request, fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct StaticHeaders(Arc<HeaderMap>);

impl StaticHeaders {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from plain name/value strings. Pairs that are not legal HTTP
    /// headers are skipped with a warning.
    #[must_use]
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut map = HeaderMap::new();
        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match (key.parse::<HeaderName>(), HeaderValue::from_str(value)) {
                (Ok(name), Ok(val)) => {
                    map.insert(name, val);
                }
                _ => {
                    tracing::warn!(header = %key, "invalid static header name or value, skipping");
                }
            }
        }
        Self(Arc::new(map))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.0.iter()
    }
}

impl From<&HashMap<String, String>> for StaticHeaders {
    fn from(map: &HashMap<String, String>) -> Self {
        Self::from_pairs(map)
    }
}

impl From<HashMap<String, String>> for StaticHeaders {
    fn from(map: HashMap<String, String>) -> Self {
        Self::from_pairs(map)
    }
}

/// Accessor for the current identifier value, as raw bytes.
///
/// Called once per request and never cached. The default reads
/// [`SUTURE_ID_ENV`] from the process environment.
#[derive(Clone)]
pub struct IdSource(Arc<dyn Fn() -> Vec<u8> + Send + Sync>);

impl IdSource {
    /// Read the named environment variable on every call. An unset variable
    /// reads as empty; non-UTF-8 values are passed through byte for byte.
    #[must_use]
    pub fn env(var: impl Into<String>) -> Self {
        let var = var.into();
        Self(Arc::new(move || {
            std::env::var_os(&var)
                .map(std::ffi::OsString::into_encoded_bytes)
                .unwrap_or_default()
        }))
    }

    #[must_use]
    pub fn from_fn<F, T>(f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
        T: Into<Vec<u8>>,
    {
        Self(Arc::new(move || f().into()))
    }

    #[must_use]
    pub fn current(&self) -> Vec<u8> {
        (self.0)()
    }
}

impl Default for IdSource {
    fn default() -> Self {
        Self::env(SUTURE_ID_ENV)
    }
}

impl fmt::Debug for IdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdSource").finish_non_exhaustive()
    }
}

/// Applies the header policy to a request in place.
#[derive(Debug, Clone, Default)]
pub struct HeaderInjector {
    headers: StaticHeaders,
    id_source: IdSource,
}

impl HeaderInjector {
    #[must_use]
    pub fn new(headers: StaticHeaders, id_source: IdSource) -> Self {
        Self { headers, id_source }
    }

    pub fn inject<B: http_body::Body>(&self, req: &mut Request<B>) {
        let has_body = carries_body(req.body());
        let headers = req.headers_mut();

        for (name, value) in self.headers.iter() {
            headers.insert(name.clone(), value.clone());
        }

        let id = self.id_source.current();
        let id_value = HeaderValue::from_bytes(&id).unwrap_or_else(|_| {
            tracing::warn!(header = SUTURE_ID_HEADER, "identifier is not a valid header value, sending empty");
            HeaderValue::from_static("")
        });
        headers.insert(HeaderName::from_static(SUTURE_ID_HEADER), id_value);

        if has_body {
            let json = HeaderValue::from_static("application/json");
            headers.insert(CONTENT_TYPE, json.clone());
            headers.insert(ACCEPT, json);
        }

        tracing::trace!(
            suture_id = %String::from_utf8_lossy(&id),
            has_body,
            "injected request headers"
        );
    }
}

/// A body counts as present unless it is already at end-of-stream or
/// declares an exact length of zero.
fn carries_body<B: http_body::Body>(body: &B) -> bool {
    !(body.is_end_stream() || body.size_hint().exact() == Some(0))
}

/// Executor decorator that injects headers before delegating.
#[derive(Debug, Clone)]
pub struct HeadersTransport<S> {
    inner: S,
    injector: HeaderInjector,
}

impl<S> HeadersTransport<S> {
    /// Wrap `inner`, reading the identifier from [`SUTURE_ID_ENV`].
    #[must_use]
    pub fn new(inner: S, headers: StaticHeaders) -> Self {
        Self::with_id_source(inner, headers, IdSource::default())
    }

    #[must_use]
    pub fn with_id_source(inner: S, headers: StaticHeaders, id_source: IdSource) -> Self {
        Self {
            inner,
            injector: HeaderInjector::new(headers, id_source),
        }
    }
}

impl<S, B> Service<Request<B>> for HeadersTransport<S>
where
    S: Service<Request<B>>,
    B: http_body::Body,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        self.injector.inject(&mut req);
        self.inner.call(req)
    }
}

/// [`Layer`] producing [`HeadersTransport`].
#[derive(Debug, Clone, Default)]
pub struct SutureIdLayer {
    injector: HeaderInjector,
}

impl SutureIdLayer {
    #[must_use]
    pub fn new(headers: StaticHeaders) -> Self {
        Self::with_id_source(headers, IdSource::default())
    }

    #[must_use]
    pub fn with_id_source(headers: StaticHeaders, id_source: IdSource) -> Self {
        Self {
            injector: HeaderInjector::new(headers, id_source),
        }
    }
}

impl<S> Layer<S> for SutureIdLayer {
    type Service = HeadersTransport<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HeadersTransport {
            inner,
            injector: self.injector.clone(),
        }
    }
}

/// Decorate `base` (or the default hyper transport when `None`) and box the
/// result.
#[must_use]
pub fn new_headers_transport(base: Option<BoxTransport>, headers: StaticHeaders) -> BoxTransport {
    new_headers_transport_with(base, headers, IdSource::default())
}

#[must_use]
pub fn new_headers_transport_with(
    base: Option<BoxTransport>,
    headers: StaticHeaders,
    id_source: IdSource,
) -> BoxTransport {
    let base = base.unwrap_or_else(default_transport);
    BoxTransport::new(HeadersTransport::with_id_source(base, headers, id_source))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use http::Response;
    use tower::ServiceExt;

    use super::*;
    use crate::transport::{empty, full, Body, BoxError};

    /// Executor that answers with the request headers it received.
    fn echo() -> BoxTransport {
        BoxTransport::new(tower::service_fn(|req: Request<Body>| async move {
            let mut response = Response::new(empty());
            *response.headers_mut() = req.headers().clone();
            Ok::<_, BoxError>(response)
        }))
    }

    fn fixed(value: &'static str) -> IdSource {
        IdSource::from_fn(move || value.to_string())
    }

    async fn send(svc: BoxTransport, req: Request<Body>) -> HeaderMap {
        svc.oneshot(req).await.unwrap().headers().clone()
    }

    #[tokio::test]
    async fn request_without_body_gets_id_and_static_headers() {
        let svc = new_headers_transport_with(
            Some(echo()),
            StaticHeaders::from_pairs([("X-Custom", "v")]),
            fixed("id-1"),
        );

        let headers = send(svc, Request::new(empty())).await;

        assert_eq!(headers.get("suture_id").unwrap(), "id-1");
        assert_eq!(headers.get("x-custom").unwrap(), "v");
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(headers.get(ACCEPT).is_none());
    }

    #[tokio::test]
    async fn request_with_body_is_labelled_json() {
        let svc = new_headers_transport_with(Some(echo()), StaticHeaders::new(), fixed("id-2"));

        let mut req = Request::new(full("plain text, not json"));
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        let headers = send(svc, req).await;

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert_eq!(headers.get(SUTURE_ID_HEADER).unwrap(), "id-2");
    }

    #[tokio::test]
    async fn empty_body_is_not_labelled() {
        let svc = new_headers_transport_with(Some(echo()), StaticHeaders::new(), fixed("x"));

        let headers = send(svc, Request::new(full(""))).await;

        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[tokio::test]
    async fn unset_identifier_sends_empty_header() {
        let svc = new_headers_transport_with(
            Some(echo()),
            StaticHeaders::from_pairs([("X-Custom", "v")]),
            IdSource::env("SUTURE_ID_UNSET_IN_TESTS"),
        );

        let headers = send(svc, Request::new(empty())).await;

        assert_eq!(headers.get("x-custom").unwrap(), "v");
        assert_eq!(headers.get("suture_id").unwrap(), "");
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(headers.get(ACCEPT).is_none());
    }

    #[tokio::test]
    async fn identifier_is_read_on_every_call() {
        let current = Arc::new(Mutex::new(String::from("abc")));
        let source = {
            let current = Arc::clone(&current);
            IdSource::from_fn(move || current.lock().unwrap().clone())
        };
        let svc = new_headers_transport_with(Some(echo()), StaticHeaders::new(), source);

        let first = send(svc.clone(), Request::new(empty())).await;
        *current.lock().unwrap() = "xyz".into();
        let second = send(svc, Request::new(empty())).await;

        assert_eq!(first.get(SUTURE_ID_HEADER).unwrap(), "abc");
        assert_eq!(second.get(SUTURE_ID_HEADER).unwrap(), "xyz");
    }

    #[test]
    fn env_source_observes_changes() {
        const VAR: &str = "SUTURE_ID_ENV_SOURCE_TEST";
        let source = IdSource::env(VAR);

        std::env::set_var(VAR, "abc");
        assert_eq!(source.current(), b"abc");
        std::env::set_var(VAR, "xyz");
        assert_eq!(source.current(), b"xyz");
        std::env::remove_var(VAR);
        assert!(source.current().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_identifier_is_forwarded_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        const VAR: &str = "SUTURE_ID_NON_UTF8_TEST";
        std::env::set_var(VAR, OsStr::from_bytes(b"caf\xe9"));
        let injector = HeaderInjector::new(StaticHeaders::new(), IdSource::env(VAR));
        let mut req = Request::new(empty());

        injector.inject(&mut req);
        std::env::remove_var(VAR);

        assert_eq!(
            req.headers().get(SUTURE_ID_HEADER).unwrap().as_bytes(),
            b"caf\xe9"
        );
    }

    #[test]
    fn header_name_matches_any_case() {
        let name = HeaderName::from_static(SUTURE_ID_HEADER);
        assert_eq!(name, "Suture_ID");
        assert_eq!("SUTURE_ID".parse::<HeaderName>().unwrap(), name);
    }

    #[test]
    fn id_source_debug_hides_accessor() {
        assert_eq!(format!("{:?}", IdSource::default()), "IdSource { .. }");
    }

    #[tokio::test]
    async fn existing_values_are_overwritten() {
        let svc = new_headers_transport_with(
            Some(echo()),
            StaticHeaders::from_pairs([("x-custom", "new")]),
            fixed("fresh"),
        );

        let mut req = Request::new(empty());
        req.headers_mut()
            .append("x-custom", HeaderValue::from_static("old-1"));
        req.headers_mut()
            .append("x-custom", HeaderValue::from_static("old-2"));
        req.headers_mut()
            .insert("suture_id", HeaderValue::from_static("stale"));
        let headers = send(svc, req).await;

        let custom: Vec<_> = headers.get_all("x-custom").iter().collect();
        assert_eq!(custom, vec!["new"]);
        assert_eq!(headers.get("suture_id").unwrap(), "fresh");
    }

    #[tokio::test]
    async fn inner_error_passes_through() {
        let failing = BoxTransport::new(tower::service_fn(|_req: Request<Body>| async {
            Err::<Response<Body>, BoxError>("connection refused".into())
        }));
        let svc = new_headers_transport_with(Some(failing), StaticHeaders::new(), fixed("id"));

        let err = svc.oneshot(Request::new(empty())).await.unwrap_err();
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn invalid_static_headers_are_skipped() {
        let headers = StaticHeaders::from_pairs([
            ("x-good", "ok"),
            ("bad header", "v"),
            ("x-bad-value", "line\nbreak"),
        ]);

        assert_eq!(headers.len(), 1);
        assert!(headers.iter().any(|(name, _)| name == "x-good"));
    }

    #[test]
    fn invalid_identifier_falls_back_to_empty() {
        let injector = HeaderInjector::new(StaticHeaders::new(), fixed("bad\r\nvalue"));
        let mut req = Request::new(empty());

        injector.inject(&mut req);

        assert_eq!(req.headers().get(SUTURE_ID_HEADER).unwrap(), "");
    }

    #[tokio::test]
    async fn layer_wraps_generic_services() {
        let svc = tower::ServiceBuilder::new()
            .layer(SutureIdLayer::with_id_source(StaticHeaders::new(), fixed("layered")))
            .service(echo());

        let response = svc.oneshot(Request::new(empty())).await.unwrap();
        assert_eq!(response.headers().get(SUTURE_ID_HEADER).unwrap(), "layered");
    }
}
