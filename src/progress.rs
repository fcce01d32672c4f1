//! Progress reporting for long-running operations.
//!
//! Operations push [`ProgressUpdate`]s into a [`ProgressSink`]. A sink that
//! panics is logged and then ignored for the rest of the run; it never
//! changes the operation's outcome.

use std::panic::{self, AssertUnwindSafe};

use serde::Serialize;
use tracing::warn;

/// One progress step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressUpdate {
    /// 1-based step number.
    pub ordinal: usize,
    /// Total number of steps, when known up front.
    pub total: Option<usize>,
    pub message: String,
}

/// Receives progress updates.
pub trait ProgressSink {
    fn report(&self, update: ProgressUpdate);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressUpdate),
{
    fn report(&self, update: ProgressUpdate) {
        self(update)
    }
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _update: ProgressUpdate) {}
}

/// Numbers updates and shields the caller from a misbehaving sink.
pub(crate) struct Reporter<'a> {
    sink: &'a dyn ProgressSink,
    total: Option<usize>,
    next: usize,
    broken: bool,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(sink: &'a dyn ProgressSink, total: Option<usize>) -> Self {
        Self {
            sink,
            total,
            next: 1,
            broken: false,
        }
    }

    /// Number of updates sent so far.
    pub(crate) fn completed(&self) -> usize {
        self.next - 1
    }

    pub(crate) fn step(&mut self, message: impl Into<String>) {
        let update = ProgressUpdate {
            ordinal: self.next,
            total: self.total,
            message: message.into(),
        };
        self.next += 1;

        if self.broken {
            return;
        }
        let sink = self.sink;
        if panic::catch_unwind(AssertUnwindSafe(|| sink.report(update))).is_err() {
            warn!("progress sink panicked; further updates are dropped");
            self.broken = true;
        }
    }
}
