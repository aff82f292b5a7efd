use std::sync::Mutex;
use std::sync::MutexGuard;
use tokio_util::sync::CancellationToken;

/// Hands out the "current" build and query cancellation tokens. At most one
/// of each is live: opening a new generation cancels its predecessor, so
/// superseded work observes the signal and exits instead of publishing.
#[derive(Default)]
pub struct GenerationController {
    build: Mutex<CancellationToken>,
    query: Mutex<CancellationToken>,
}

impl GenerationController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels the in-flight build, if any, and opens a new build generation.
    pub fn begin_build(&self) -> CancellationToken {
        let mut guard = lock(&self.build);
        guard.cancel();
        *guard = CancellationToken::new();
        guard.clone()
    }

    /// Cancels the current query, if any, and opens a new query generation
    /// tied to the caller's token: either a newer query or the caller itself
    /// can stop the work.
    pub fn begin_query(&self, caller: &CancellationToken) -> CancellationToken {
        let mut guard = lock(&self.query);
        guard.cancel();
        *guard = caller.child_token();
        guard.clone()
    }
}

fn lock(mutex: &Mutex<CancellationToken>) -> MutexGuard<'_, CancellationToken> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
