//! Span helpers for the process and for individual reconciliations.

use std::fmt::Display;
use std::time::Duration;

use tracing::{Span, field, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the application-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    #[must_use]
    /// Enter the application-level tracing span for the lifetime of the guard.
    pub fn new(component: impl Into<String>) -> Self {
        let component = component.into();
        let span: &'static Span = Box::leak(Box::new(tracing::info_span!(
            "app",
            component = %component,
            build_sha = %build_sha()
        )));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

/// Span wrapping one reconciliation pass.
///
/// `requeue_secs` starts empty and is filled in by [`record_requeue`].
#[must_use]
pub fn reconcile_span(resource: &impl Display) -> Span {
    tracing::info_span!(
        "reconcile",
        resource = %resource,
        requeue_secs = field::Empty
    )
}

/// Record the requeue delay chosen by a pass on its span.
pub fn record_requeue(span: &Span, requeue_after: Option<Duration>) {
    if let Some(delay) = requeue_after {
        span.record("requeue_secs", delay.as_secs());
    }
}
