//! Suture transport stamps outgoing HTTP requests with a tracing identifier.
//!
//! A Kubernetes operator installs it on its client configuration so that
//! every request, including those issued by the Kubernetes API client,
//! carries the `Suture_ID` header read from the `SUTURE_ID` environment
//! variable.
//!
//! # Architecture
//!
//! - [`transport`] -- Executor types and the header-injecting decorator
//!   ([`HeadersTransport`](transport::HeadersTransport)), a `tower::Service`
//!   wrapper over any request executor.
//! - [`rest`] -- Client configuration with a transport-construction hook and
//!   the installer that chains the decorator after an existing hook.
//! - [`config`] -- Transport config file loading and validation.
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (probe, headers, validate).
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `json` | JSON config file support |
//! | `toml` | TOML config file support |
//! | `kube` | `kube::Client` builder with the header layer installed |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod rest;
pub mod transport;

pub use rest::{wrap_rest_config_with_suture_id, RestConfig};
pub use transport::{HeadersTransport, SutureIdLayer};
