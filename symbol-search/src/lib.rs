/*!
# Symbol Search

Incremental go-to-symbol search over a live index of declared symbols.

## Features

- **Background indexing**: workspace changes rebuild the index off the
  query path, cancelling the build they supersede
- **Incremental queries**: a query refining the previous one rescans only
  the prior filtered results
- **Streaming results**: matches reach the sink as they are found
- **Cooperative cancellation**: a newer build or query stops the stale one
  at bounded checkpoints, never preemptively
- **Pluggable extraction**: symbol records come from a host-provided
  per-document source, fanned out concurrently

## Example

```rust,no_run
use std::sync::Arc;
use symnav_symbol_search::{
    Document, ResultCallback, SearchConfig, SymbolRecord, SymbolSearchService, SymbolSource,
    Workspace, WorkspaceProvider,
};
use tokio_util::sync::CancellationToken;

struct Extractor;

#[async_trait::async_trait]
impl SymbolSource for Extractor {
    async fn extract_symbols(&self, _document: &Document) -> anyhow::Result<Vec<SymbolRecord>> {
        Ok(Vec::new())
    }
}

struct Solution;

impl WorkspaceProvider for Solution {
    fn workspaces(&self) -> Vec<Workspace> {
        Vec::new()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let service = SymbolSearchService::new(
        Arc::new(Solution),
        Arc::new(Extractor),
        SearchConfig::default(),
    )?;
    service.notify_workspace_changed();

    let sink: ResultCallback = Arc::new(|hit| println!("{} ({})", hit.matched_text, hit.rank));
    let outcome = service
        .search("Foo", None, &CancellationToken::new(), sink)
        .await?;
    if let Some(outcome) = outcome {
        println!("reported {} matches", outcome.reported);
    }
    Ok(())
}
```
*/

pub mod config;
pub mod error;
pub mod index;
pub mod proto;
pub mod source;

pub use config::SearchConfig;
pub use error::{Result, SearchError};
pub use index::{
    IndexBuilder, IndexSnapshot, ResultCallback, SearchOutcome, SearchSession,
    SymbolSearchService,
};
pub use proto::{MatchHit, SearchPattern, SymbolKind, SymbolRecord, is_valid_tag, tags};
pub use source::{Document, Project, SymbolSource, Workspace, WorkspaceProvider};
