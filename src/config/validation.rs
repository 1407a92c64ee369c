//! Configuration validation with detailed error reporting.
//!
//! The [`validate`] function checks a parsed [`TransportConfig`] for a
//! malformed host, illegal header names or values, a statically configured
//! identifier header, and a zero timeout. Every problem is reported at once.

use http::{HeaderName, HeaderValue};
use url::Url;

use super::model::TransportConfig;
use crate::error::ValidationError;
use crate::transport::SUTURE_ID_HEADER;

/// Validate the API server host. Returns `Ok(())` or a human-readable error.
pub fn validate_host(host: &str) -> Result<(), String> {
    match Url::parse(host) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            if scheme != "http" && scheme != "https" {
                Err(format!(
                    "unsupported scheme '{scheme}' (expected http or https)"
                ))
            } else if parsed.host_str().is_none() {
                Err(format!("'{host}' has no host"))
            } else {
                Ok(())
            }
        }
        Err(_) => Err(format!("'{host}' is not a valid URL")),
    }
}

pub fn validate(config: &TransportConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(ref host) = config.host {
        if let Err(msg) = validate_host(host) {
            errors.push(ValidationError {
                field: "host".into(),
                message: msg,
                suggestion: if host.contains("://") {
                    None
                } else {
                    Some(format!("did you mean 'https://{host}'?"))
                },
            });
        }
    }

    if config.timeout == 0 {
        errors.push(ValidationError {
            field: "timeout".into(),
            message: "must be greater than zero".into(),
            suggestion: None,
        });
    }

    // Sorted so the report is stable across runs.
    let mut names: Vec<&String> = config.headers.keys().collect();
    names.sort();

    for (i, name) in names.iter().enumerate() {
        let field = format!("headers.{name}");
        if let Some(first) = names[..i].iter().find(|n| n.eq_ignore_ascii_case(name)) {
            errors.push(ValidationError {
                field,
                message: format!("duplicates '{first}' (header names are case-insensitive)"),
                suggestion: Some("keep only one spelling".into()),
            });
            continue;
        }
        match name.parse::<HeaderName>() {
            Ok(parsed) if parsed == SUTURE_ID_HEADER => {
                errors.push(ValidationError {
                    field,
                    message: "identifier header cannot be set statically".into(),
                    suggestion: Some("set the SUTURE_ID environment variable instead".into()),
                });
                continue;
            }
            Ok(_) => {}
            Err(_) => {
                errors.push(ValidationError {
                    field,
                    message: format!("'{name}' is not a valid header name"),
                    suggestion: None,
                });
                continue;
            }
        }

        if HeaderValue::from_str(&config.headers[*name]).is_err() {
            errors.push(ValidationError {
                field,
                message: "header value contains invalid characters".into(),
                suggestion: None,
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[must_use]
pub fn format_validation_report(path: &str, config: &TransportConfig) -> String {
    let mut lines = vec![format!(
        "  host:    {}",
        config.host.as_deref().unwrap_or("(none)")
    )];
    lines.push(format!("  timeout: {}ms", config.timeout));

    let mut headers: Vec<_> = config.headers.iter().collect();
    headers.sort();
    if headers.is_empty() {
        lines.push("  headers: (none)".into());
    } else {
        lines.push(format!("  headers: {}", headers.len()));
        for (name, value) in headers {
            lines.push(format!("    {name}: {value}"));
        }
    }

    format!("{} is valid\n{}", path, lines.join("\n"))
}
