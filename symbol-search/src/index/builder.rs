use crate::config::SearchConfig;
use crate::proto::SymbolRecord;
use crate::source::SymbolSource;
use crate::source::Workspace;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// One immutable aggregate of every declared symbol across the workspaces,
/// produced per build. Order carries no meaning. Shared as
/// `Arc<IndexSnapshot>` and replaced, never mutated, on rebuild.
#[derive(Clone, Debug, Default)]
pub struct IndexSnapshot {
    pub symbols: Vec<SymbolRecord>,
}

/// Walks workspace -> project -> document and fans each document out to the
/// symbol source concurrently. A document that fails to extract is dropped
/// from the aggregate; only the build token stops the build itself.
pub struct IndexBuilder {
    source: Arc<dyn SymbolSource>,
    max_concurrent: usize,
}

impl IndexBuilder {
    pub fn new(source: Arc<dyn SymbolSource>, config: &SearchConfig) -> Self {
        Self {
            source,
            max_concurrent: config.max_concurrent.max(1),
        }
    }

    /// Builds a snapshot from every document in `workspaces`. Once `cancel`
    /// fires the build stops dispatching and collecting, returning whatever
    /// partial aggregate it has; cancellation is never an error.
    pub async fn build(
        &self,
        workspaces: &[Workspace],
        cancel: &CancellationToken,
    ) -> IndexSnapshot {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = Vec::new();
        'dispatch: for workspace in workspaces {
            for project in &workspace.projects {
                for document in &project.documents {
                    if cancel.is_cancelled() {
                        break 'dispatch;
                    }
                    let permit = tokio::select! {
                        _ = cancel.cancelled() => break 'dispatch,
                        permit = semaphore.clone().acquire_owned() => match permit {
                            Ok(permit) => permit,
                            Err(_) => break 'dispatch,
                        },
                    };
                    let source = self.source.clone();
                    let document = document.clone();
                    let token = cancel.clone();
                    tasks.push(tokio::spawn(async move {
                        if token.is_cancelled() {
                            return Vec::new();
                        }
                        let symbols = match source.extract_symbols(&document).await {
                            Ok(symbols) => symbols,
                            Err(err) => {
                                warn!(
                                    "symbol extraction failed for {}: {err:?}",
                                    document.path
                                );
                                Vec::new()
                            }
                        };
                        drop(permit);
                        symbols
                    }));
                }
            }
        }

        let mut snapshot = IndexSnapshot::default();
        for task in tasks {
            if cancel.is_cancelled() {
                task.abort();
                continue;
            }
            match task.await {
                Ok(symbols) => snapshot.symbols.extend(symbols),
                Err(err) if err.is_cancelled() => {}
                Err(err) => warn!("symbol extraction task failed: {err:?}"),
            }
        }
        snapshot
    }
}
