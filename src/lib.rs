//! ceno-proxy is the local node of a censorship-circumvention retrieval
//! network.
//!
//! A browser asks it for a URL. The proxy checks the URL's shape, asks
//! the local cache server (LCS) whether a bundle for it exists, asks the
//! request server (RS) to produce one when it does not, and answers with
//! the bundle, a "please wait" page, or an error page.
//!
//! # Architecture
//!
//! - [`cli`] -- Command-line argument parsing with clap derive macros.
//! - [`cmd`] -- Subcommand dispatch and execution (run, init, validate, probe).
//! - [`config`] -- Configuration loading and validation via the
//!   [`ConfigSource`](config::ConfigSource) trait.
//! - [`error`] -- Unified error types using `thiserror`.
//! - [`logging`] -- Structured tracing setup with JSON and pretty-print output.
//! - [`proxy`] -- The inbound HTTP handler and requested-URL extraction.
//! - [`retrieval`] -- URL validation, the serve/create/wait decision, and
//!   page rendering.
//! - [`server`] -- Axum server setup, shared application state, HTTP client, and
//!   graceful shutdown.
//! - [`upstream`] -- Clients for the cache and request servers behind the
//!   [`Transport`](upstream::Transport) trait.
//!
//! # Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `yaml` | YAML config file support _(enabled by default)_ |
//! | `toml` | TOML config file support |
//! | `file-backends` | All file format backends |
//! | `full` | All features |

// Binary crate: public functions are internal, not consumed by external users.
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod proxy;
pub mod retrieval;
pub mod server;
pub mod upstream;
