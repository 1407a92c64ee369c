//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function sets up logging and routes the parsed CLI to
//! the appropriate subcommand handler: [`probe`], [`headers`] or
//! [`validate`]. Each handler lives in its own submodule.

pub mod headers;
pub mod probe;
pub mod validate;

use crate::cli::{Cli, Commands, TransportArgs};
use crate::config;
use crate::config::model::TransportConfig;
use crate::error::SutureError;
use crate::logging;

pub async fn dispatch(cli: Cli) -> Result<(), SutureError> {
    let format = logging::resolve_format(cli.pretty, cli.json_logs);
    logging::init(&cli.log_level, format);

    match cli.command {
        Some(Commands::Probe(args)) => probe::execute(args).await,
        Some(Commands::Headers(args)) => headers::execute(args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

/// Load the config file (if any) and apply CLI overrides on top of it.
pub(crate) async fn resolve_transport_config(
    args: &TransportArgs,
) -> Result<TransportConfig, SutureError> {
    let mut config = config::load_or_default(args.config.as_deref()).await?;
    apply_overrides(&mut config, args);

    if let Err(errors) = config::validation::validate(&config) {
        return Err(SutureError::ConfigValidation { errors });
    }
    Ok(config)
}

/// Flags win over the file. Header names compare case-insensitively, so a
/// flag replaces a file entry spelled differently.
fn apply_overrides(config: &mut TransportConfig, args: &TransportArgs) {
    if let Some(ref host) = args.host {
        config.host = Some(host.clone());
    }
    for (name, value) in &args.headers {
        config
            .headers
            .retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        config.headers.insert(name.clone(), value.clone());
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  suture v{version} \u{2014} Suture_ID header transport\n\n  \
         No command provided. To get started:\n\n    \
         suture headers                       Show the headers that would be sent\n    \
         suture probe <url>                   Send a request through the transport\n    \
         suture validate suture.yaml          Check a config file\n    \
         suture --help                        See all commands and options\n"
    );
}
