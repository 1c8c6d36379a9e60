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

//! Environment-driven configuration for the operator.
//!
//! Layout: `model.rs` (typed settings), `loader.rs` (environment lookup),
//! `validate.rs` (field parsers), `error.rs` (`ConfigError`).

pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{ControllerSettings, LoggingSettings, OperatorConfig, QbittorrentSettings};
