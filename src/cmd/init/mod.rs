//! `ceno-proxy init`: generate a starter configuration file.
//!
//! Supports two modes:
//! - **Template mode** (default): writes a static template config file.
//! - **Interactive mode** (`--interactive`): walks through a step-by-step wizard.
//!
//! The wizard's prompts are also what `run` falls back to when no
//! configuration exists ([`collect_for_run`]).

mod interactive;
mod serialize;
mod template;

use crate::cli::InitArgs;
use crate::error::ProxyError;

pub use interactive::{can_prompt, collect_for_run};

pub fn execute(args: &InitArgs) -> Result<(), ProxyError> {
    if args.interactive {
        interactive::run(args)
    } else {
        template::run(args)
    }
}
