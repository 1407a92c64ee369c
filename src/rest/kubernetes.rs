//! `kube::Client` with the header-injecting layer installed.
//!
//! The layer sits outermost in the client's tower stack, so it sees every
//! request the client issues before authentication and base-URI rewriting.

use kube::client::ClientBuilder;
use kube::{Client, Config};

use crate::transport::{IdSource, StaticHeaders, SutureIdLayer};

/// Build a client from `config` whose requests carry `Suture_ID`, read from
/// the `SUTURE_ID` environment variable on every call.
pub fn client_with_suture_id(config: Config) -> Result<Client, kube::Error> {
    client_with_headers(config, StaticHeaders::new(), IdSource::default())
}

pub fn client_with_headers(
    config: Config,
    headers: StaticHeaders,
    id_source: IdSource,
) -> Result<Client, kube::Error> {
    // Same provider choice as the default transport.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cluster = config.cluster_url.to_string();
    let client = ClientBuilder::try_from(config)?
        .with_layer(&SutureIdLayer::with_id_source(headers, id_source))
        .build();

    tracing::debug!(cluster = %cluster, "built kube client with suture id layer");
    Ok(client)
}
