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

//! qBittorrent operator bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (startup sequence and shutdown signals),
//! `controller.rs` (kube-runtime controller), `store.rs` (Kubernetes-backed
//! `TorrentStore`), `error.rs` (`AppError`).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// kube-runtime controller wiring.
pub mod controller;
/// Application error types.
pub mod error;
/// Kubernetes API adapter for the reconciler.
pub mod store;

pub use bootstrap::run_app;
pub use controller::run_controller;
pub use error::{AppError, AppResult};
pub use store::KubeTorrentStore;
