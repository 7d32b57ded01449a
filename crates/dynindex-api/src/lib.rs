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

//! HTTP control surface: `/index`, `/truncate`, `/health` and `/metrics`.
//!
//! Layout: `state.rs` (shared handler state), `http/` (router, handlers,
//! middleware, plaintext errors), `error.rs` (bind and serve failures).

pub mod error;
mod http;
mod state;

pub use error::{ApiServerError, ApiServerResult};
pub use http::router::ApiServer;
