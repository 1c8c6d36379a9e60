#![forbid(unsafe_code)]
#![warn(
    unused,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]

//! Reconciliation of `Torrent` resources against the remote download service.
//!
//! Layout: `reconciler.rs` (the pass), `status.rs` (field mirroring),
//! `outcome.rs` (requeue values and delays), `store.rs` (persistence seam),
//! `error.rs` (pass failures).

pub mod error;
pub mod outcome;
pub mod reconciler;
pub mod status;
pub mod store;

pub use error::ReconcileError;
pub use outcome::{Outcome, RequeuePolicy};
pub use reconciler::TorrentReconciler;
pub use status::sync_status;
pub use store::{StoreError, TorrentStore};
