//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`run`], [`init`], [`validate`], or [`probe`].
//! Each handler lives in its own submodule.

pub mod init;
pub mod probe;
pub mod run;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::ProxyError;

pub async fn dispatch(cli: Cli) -> Result<(), ProxyError> {
    match cli.command {
        Some(Commands::Run(args)) => run::execute(args).await,
        Some(Commands::Init(ref args)) => init::execute(args),
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Probe(args)) => probe::execute(args).await,
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  ceno-proxy v{version}: local bundle-retrieval proxy node\n\n  \
         No command provided. To get started:\n\n    \
         ceno-proxy init -i                Create a config step by step\n    \
         ceno-proxy probe                  Check the cache and request servers\n    \
         ceno-proxy run                    Start the proxy (auto-detects ./ceno.json)\n    \
         ceno-proxy --help                 See all commands and options\n"
    );
}
