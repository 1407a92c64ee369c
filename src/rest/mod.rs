//! Kubernetes-style client configuration and the `Suture_ID` installer.
//!
//! [`RestConfig`] carries the API server host and an optional
//! transport-construction hook ([`WrapTransport`]). The client framework
//! applies the hook once, when it turns the configuration into an executor
//! via [`RestConfig::transport`].
//!
//! [`wrap_rest_config_with_suture_id`] chains the header-injecting executor
//! after whatever hook is already installed. Each call adds one layer.
//!
//! With the `kube` feature, [`kubernetes`] applies the same decorator to a
//! `kube::Client`.

#[cfg(feature = "kube")]
pub mod kubernetes;

use std::fmt;
use std::sync::Arc;

use crate::error::SutureError;
use crate::transport::{
    default_transport, BoxTransport, HeadersTransport, IdSource, StaticHeaders,
};

/// Transport-construction hook: base executor in, decorated executor out.
pub type WrapTransport = Arc<dyn Fn(BoxTransport) -> BoxTransport + Send + Sync>;

#[derive(Clone, Default)]
pub struct RestConfig {
    /// Base URL of the API server, e.g. `https://kubernetes.default.svc`.
    pub host: String,
    pub wrap_transport: Option<WrapTransport>,
}

impl fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestConfig")
            .field("host", &self.host)
            .field("wrap_transport", &self.wrap_transport.is_some())
            .finish()
    }
}

impl RestConfig {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            wrap_transport: None,
        }
    }

    /// Build the executor for this configuration on top of the default
    /// hyper transport.
    #[must_use]
    pub fn transport(&self) -> BoxTransport {
        self.transport_with(default_transport())
    }

    /// Build the executor for this configuration on top of `base`.
    #[must_use]
    pub fn transport_with(&self, base: BoxTransport) -> BoxTransport {
        match &self.wrap_transport {
            Some(wrap) => wrap(base),
            None => base,
        }
    }

    /// Resolve `target` against the configured host. Absolute URLs are
    /// returned unchanged.
    pub fn resolve(&self, target: &str) -> Result<url::Url, SutureError> {
        if let Ok(url) = url::Url::parse(target) {
            return Ok(url);
        }
        let base = url::Url::parse(&self.host).map_err(|e| SutureError::UriParse {
            source: Box::new(e),
        })?;
        base.join(target).map_err(|e| SutureError::UriParse {
            source: Box::new(e),
        })
    }
}

/// Install the `Suture_ID` header transport on `config`, after any hook
/// already present. Does nothing when `config` is `None`.
pub fn wrap_rest_config_with_suture_id(config: Option<&mut RestConfig>) {
    wrap_rest_config_with_headers(config, StaticHeaders::new(), IdSource::default());
}

/// General form of [`wrap_rest_config_with_suture_id`] with static headers
/// and an explicit identifier accessor.
pub fn wrap_rest_config_with_headers(
    config: Option<&mut RestConfig>,
    headers: StaticHeaders,
    id_source: IdSource,
) {
    let Some(config) = config else {
        return;
    };

    let previous = config.wrap_transport.take();
    tracing::debug!(
        host = %config.host,
        chained = previous.is_some(),
        static_headers = headers.len(),
        "installing suture id transport"
    );

    config.wrap_transport = Some(Arc::new(move |base: BoxTransport| {
        let intermediate = match &previous {
            Some(wrap) => wrap(base),
            None => base,
        };
        BoxTransport::new(HeadersTransport::with_id_source(
            intermediate,
            headers.clone(),
            id_source.clone(),
        ))
    }));
}
