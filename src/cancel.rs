use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{AnalysisError, Result};

/// Shared abort flag with an optional deadline.
///
/// Clones observe the same flag, so a caller can keep one handle and pass
/// another into the analysis. Analyzers poll [`CancelToken::check`] between
/// windows; an aborted run just drops its partial work.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<(Instant, Duration)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A limit too far out to represent as an `Instant` means no deadline.
    pub fn with_timeout(limit: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(limit).map(|at| (at, limit)),
        }
    }

    /// Same flag, deadline replaced (or set) to `limit` from now. A limit too
    /// far out to represent as an `Instant` means no deadline.
    pub fn with_deadline(&self, limit: Option<Duration>) -> Self {
        Self {
            flag: Arc::clone(&self.flag),
            deadline: match limit {
                Some(l) => Instant::now().checked_add(l).map(|at| (at, l)),
                None => self.deadline,
            },
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }
        if let Some((deadline, limit)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(AnalysisError::Timeout { limit });
            }
        }
        Ok(())
    }
}
