mod builder;
mod generation;
mod matcher;
mod session;

pub use builder::IndexBuilder;
pub use builder::IndexSnapshot;
pub use session::ResultCallback;
pub use session::SearchSession;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::error::SearchError;
use crate::proto::SearchPattern;
use crate::proto::SymbolRecord;
use crate::proto::is_valid_tag;
use crate::source::SymbolSource;
use crate::source::WorkspaceProvider;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::future::Shared;
use generation::GenerationController;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::warn;

type SharedBuild = Shared<BoxFuture<'static, Arc<IndexSnapshot>>>;

/// Outcome of one accepted query. The hits themselves were already
/// streamed to the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub reported: usize,
}

/// Coordinates index builds and query evaluation: owns the current build
/// future, the last completed session (for prefix reuse), and the
/// generation controller that keeps at most one build and one query live.
#[derive(Clone)]
pub struct SymbolSearchService {
    inner: Arc<Inner>,
}

struct Inner {
    workspaces: Arc<dyn WorkspaceProvider>,
    builder: IndexBuilder,
    build: Mutex<Option<SharedBuild>>,
    last_session: Mutex<Option<SearchSession>>,
    generations: GenerationController,
}

impl SymbolSearchService {
    pub fn new(
        workspaces: Arc<dyn WorkspaceProvider>,
        source: Arc<dyn SymbolSource>,
        config: SearchConfig,
    ) -> Result<Self> {
        config.validate().map_err(SearchError::Config)?;
        let builder = IndexBuilder::new(source, &config);
        Ok(Self {
            inner: Arc::new(Inner {
                workspaces,
                builder,
                build: Mutex::new(None),
                last_session: Mutex::new(None),
                generations: GenerationController::new(),
            }),
        })
    }

    /// Evaluates one query, streaming every match to `sink`.
    ///
    /// Returns `Ok(None)` without searching when the tag is non-empty but
    /// unrecognized or the pattern carries a jump-to-line suffix. A query
    /// superseded or cancelled mid-scan keeps its already-streamed hits and
    /// surfaces as `SearchError::Cancelled`.
    pub async fn search(
        &self,
        pattern_text: &str,
        tag: Option<&str>,
        cancel: &CancellationToken,
        sink: ResultCallback,
    ) -> Result<Option<SearchOutcome>> {
        if let Some(tag) = tag
            && !is_valid_tag(tag)
        {
            return Ok(None);
        }
        let pattern = SearchPattern::parse(pattern_text, tag);
        if pattern.line_suffix {
            return Ok(None);
        }

        let token = self.inner.generations.begin_query(cancel);
        let snapshot = self.resolve_snapshot(&token).await;
        if token.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        let started = Instant::now();
        let mut session = SearchSession::new(pattern);
        let mut guard = lock(&self.inner.last_session);
        let previous = guard.take();
        let reuse = previous
            .as_ref()
            .is_some_and(|prev| prev.can_extend(&session));
        let candidates: &[SymbolRecord] =
            match (reuse, previous.as_ref().and_then(SearchSession::filtered)) {
                (true, Some(filtered)) => filtered,
                _ => &snapshot.symbols,
            };
        let candidate_count = candidates.len();
        let reported = session.evaluate(candidates, &token, &sink);
        let completed = session.filtered().is_some();
        debug!(
            "symbol search scanned {candidate_count} candidates, reported {reported} in {}ms",
            started.elapsed().as_millis()
        );
        // An abandoned session is still installed: its indeterminate
        // filtered list blocks reuse without discarding the streamed hits.
        *guard = Some(session);
        drop(guard);

        if !completed {
            return Err(SearchError::Cancelled);
        }
        Ok(Some(SearchOutcome { reported }))
    }

    /// The workspace set changed: the current index no longer reflects it.
    pub fn notify_workspace_changed(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            this.rebuild_index().await;
        });
    }

    /// Cancels any in-flight build, starts a fresh one over the current
    /// workspace set, installs it as the build queries await, and waits for
    /// it to finish. Returns the number of symbols indexed.
    pub async fn rebuild_index(&self) -> usize {
        let token = self.inner.generations.begin_build();
        let this = self.clone();
        let handle = tokio::spawn(async move {
            let workspaces = this.inner.workspaces.workspaces();
            Arc::new(this.inner.builder.build(&workspaces, &token).await)
        });
        let shared: SharedBuild = handle
            .map(|joined| match joined {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    warn!("index build task failed: {err:?}");
                    Arc::new(IndexSnapshot::default())
                }
            })
            .boxed()
            .shared();
        {
            let mut guard = lock(&self.inner.build);
            *guard = Some(shared.clone());
        }
        {
            // The last session's filtered list was computed against the
            // superseded snapshot; it must not seed reuse against this one.
            let mut guard = lock(&self.inner.last_session);
            *guard = None;
        }
        let snapshot = shared.await;
        snapshot.symbols.len()
    }

    /// The candidate snapshot for a query: the build in flight (or last
    /// completed), else a one-off build under the query's own token. The
    /// one-off result is not installed, matching a query that merely needed
    /// an index once before any workspace-change notification arrived.
    async fn resolve_snapshot(&self, token: &CancellationToken) -> Arc<IndexSnapshot> {
        let in_flight = lock(&self.inner.build).clone();
        match in_flight {
            Some(shared) => shared.await,
            None => {
                let workspaces = self.inner.workspaces.workspaces();
                Arc::new(self.inner.builder.build(&workspaces, token).await)
            }
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
