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

//! Logging primitives shared across the operator workspace.
//!
//! Layout: `init.rs` (subscriber installation and formats), `context.rs`
//! (process and reconcile spans), `error.rs` (`TelemetryError`).

pub mod context;
pub mod error;
pub mod init;

pub use context::{GlobalContextGuard, reconcile_span, record_requeue};
pub use error::{Result, TelemetryError};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
