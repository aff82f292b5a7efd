use crate::proto::SymbolRecord;
use async_trait::async_trait;

/// One source document inside a project. What a document is (a file, a
/// buffer, a generated unit) is the host's business.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    pub path: String,
}

#[derive(Clone, Debug, Default)]
pub struct Project {
    pub name: String,
    pub documents: Vec<Document>,
}

#[derive(Clone, Debug, Default)]
pub struct Workspace {
    pub projects: Vec<Project>,
}

/// Produces the declared symbols of one document. Implementations must be
/// callable concurrently; a failure only drops that document from the
/// aggregate, never the whole build.
#[async_trait]
pub trait SymbolSource: Send + Sync {
    async fn extract_symbols(&self, document: &Document) -> anyhow::Result<Vec<SymbolRecord>>;
}

/// Supplies the current workspace set. Enumeration itself (solution files,
/// project models) lives outside this crate.
pub trait WorkspaceProvider: Send + Sync {
    fn workspaces(&self) -> Vec<Workspace>;
}
