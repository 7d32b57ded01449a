#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![warn(unreachable_pub, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Process configuration for the dynamic indexing server.
//!
//! Layout: `model.rs` (the immutable `ServiceConfig`), `args.rs` (command-line
//! and environment surface), `duration.rs` (Go-style duration parsing),
//! `error.rs` (configuration errors).

pub mod args;
pub mod duration;
pub mod error;
pub mod model;

pub use args::{DEFAULT_LOG_LEVEL, LogFormatArg, ServerArgs};
pub use duration::parse_duration;
pub use error::{ConfigError, ConfigResult};
pub use model::{DEFAULT_INDEX_TIMEOUT, DEFAULT_LISTEN_ADDR, ServiceConfig};
