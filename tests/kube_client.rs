//! Integration tests: a real `kube::Client` built with the header layer.

#![cfg(feature = "kube")]

mod common;

use std::collections::BTreeMap;

use common::start_echo_server;
use suture_transport::rest::kubernetes::client_with_headers;
use suture_transport::transport::{IdSource, StaticHeaders};

fn config_for(addr: std::net::SocketAddr) -> kube::Config {
    kube::Config::new(format!("http://{addr}").parse().unwrap())
}

#[tokio::test]
async fn kube_client_requests_carry_identifier() {
    let (addr, shutdown) = start_echo_server().await;

    let client = client_with_headers(
        config_for(addr),
        StaticHeaders::from_pairs([("X-Team", "platform")]),
        IdSource::from_fn(|| "kube-operator"),
    )
    .unwrap();

    let req = http::Request::get("/echo").body(Vec::new()).unwrap();
    let headers: BTreeMap<String, String> = client.request(req).await.unwrap();

    assert_eq!(
        headers.get("suture_id").map(String::as_str),
        Some("kube-operator")
    );
    assert_eq!(headers.get("x-team").map(String::as_str), Some("platform"));

    let _ = shutdown.send(());
}

#[tokio::test]
async fn kube_client_json_bodies_are_labelled() {
    let (addr, shutdown) = start_echo_server().await;

    let client = client_with_headers(
        config_for(addr),
        StaticHeaders::new(),
        IdSource::from_fn(|| "with-body"),
    )
    .unwrap();

    let req = http::Request::post("/echo")
        .body(br#"{"kind":"ConfigMap"}"#.to_vec())
        .unwrap();
    let headers: BTreeMap<String, String> = client.request(req).await.unwrap();

    assert_eq!(
        headers.get("content-type").map(String::as_str),
        Some("application/json")
    );
    assert_eq!(
        headers.get("suture_id").map(String::as_str),
        Some("with-body")
    );

    let _ = shutdown.send(());
}
