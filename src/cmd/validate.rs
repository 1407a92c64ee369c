//! `suture validate` — check a configuration file for errors.

use std::fmt::Write;

use serde::Serialize;

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config;
use crate::config::model::TransportConfig;
use crate::config::validation;
use crate::error::{SutureError, ValidationError};

/// Machine-readable outcome, printed with `--format json`.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub path: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<&'a TransportConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorEntry<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEntry<'a> {
    pub field: &'a str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<&'a str>,
}

impl<'a> ErrorEntry<'a> {
    fn from_error(error: &'a ValidationError) -> Self {
        Self {
            field: &error.field,
            message: &error.message,
            suggestion: error.suggestion.as_deref(),
        }
    }
}

pub async fn execute(args: &ValidateArgs) -> Result<(), SutureError> {
    let config = config::read(&args.config).await?;
    let path = args.config.display().to_string();
    let outcome = validation::validate(&config);

    let report = match &outcome {
        Ok(()) => Report {
            path: path.clone(),
            valid: true,
            config: Some(&config),
            errors: Vec::new(),
        },
        Err(errors) => Report {
            path: path.clone(),
            valid: false,
            config: None,
            errors: errors.iter().map(ErrorEntry::from_error).collect(),
        },
    };

    match args.format {
        ValidateFormat::Json => {
            let rendered =
                serde_json::to_string(&report).map_err(|e| SutureError::ConfigParse {
                    path: path.clone(),
                    source: Box::new(e),
                })?;
            println!("{rendered}");
        }
        ValidateFormat::Text if report.valid => {
            println!(
                "\u{2713} {}",
                validation::format_validation_report(&path, &config)
            );
        }
        ValidateFormat::Text => eprintln!("{}", render_failure(&report)),
    }

    outcome.map_err(|errors| SutureError::ConfigValidation { errors })
}

/// Text form of a failed report: a summary line, then one line per field.
#[must_use]
pub fn render_failure(report: &Report<'_>) -> String {
    let noun = if report.errors.len() == 1 { "error" } else { "errors" };
    let mut out = format!(
        "\u{2717} {} has {} {noun}\n",
        report.path,
        report.errors.len()
    );
    for entry in &report.errors {
        // write! to String only fails on OOM
        let _ = write!(out, "\n  {}: {}", entry.field, entry.message);
        if let Some(suggestion) = entry.suggestion {
            let _ = write!(out, " ({suggestion})");
        }
    }
    out
}
