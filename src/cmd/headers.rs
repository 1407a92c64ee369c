//! `suture headers` — show what the transport would add to a request.
//!
//! Builds a throwaway request (with a body when `--data` is given), runs
//! it through the same [`HeaderInjector`] the transport uses, and prints
//! the resulting headers sorted by name. Nothing is sent.

use http::{HeaderMap, Request};

use crate::cli::HeadersArgs;
use crate::error::SutureError;
use crate::transport::{empty, full, HeaderInjector, IdSource, StaticHeaders};

pub async fn execute(args: HeadersArgs) -> Result<(), SutureError> {
    let config = super::resolve_transport_config(&args.transport).await?;
    let injector = HeaderInjector::new(StaticHeaders::from(&config.headers), IdSource::default());

    let headers = preview(&injector, args.data);
    for line in render(&headers) {
        println!("{line}");
    }
    Ok(())
}

/// Headers the injector sets on a request carrying `data`.
#[must_use]
pub fn preview(injector: &HeaderInjector, data: Option<String>) -> HeaderMap {
    let body = data.map_or_else(empty, full);
    let mut req = Request::new(body);
    injector.inject(&mut req);
    req.into_parts().0.headers
}

/// `name: value` lines sorted by header name.
#[must_use]
pub fn render(headers: &HeaderMap) -> Vec<String> {
    let mut lines: Vec<String> = headers
        .iter()
        .map(|(name, value)| format!("{name}: {}", String::from_utf8_lossy(value.as_bytes())))
        .collect();
    lines.sort();
    lines
}
