use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::foundation::error::{FilmError, FilmResult};

/// Cooperative cancellation flag shared between a caller and a running stage.
///
/// Stages poll it between passes; a pass that has started always runs to completion.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` naming `stage` when cancellation was requested.
    pub fn check(&self, stage: &str) -> FilmResult<()> {
        if self.is_cancelled() {
            tracing::debug!(stage, "cancellation observed");
            return Err(FilmError::cancelled(format!("stopped before {stage}")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/cancel.rs"]
mod tests;
