#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Binary entrypoint for the dynamic index server.

use dynindex_app::{AppResult, run_app};

/// Parses options, prepares the working directories and serves until the
/// listener fails.
#[tokio::main]
async fn main() -> AppResult<()> {
    run_app().await
}
