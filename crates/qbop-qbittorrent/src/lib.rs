#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! qBittorrent Web API client used by the reconciler.
//!
//! Layout: `client.rs` (`QbClient` and the four API calls), `session.rs`
//! (session token, credentials and cookie parsing).

pub mod client;
mod session;

pub use client::{QbClient, QbClientOptions};
pub use session::Credentials;
