//! Read-only access to the course knowledge graph.
//!
//! The graph is optional. Every read goes through a [`GraphReader`], which
//! never returns an error: a query that finds nothing yields
//! [`Fetched::Empty`], and a missing connection or a failed query yields
//! [`Fetched::Unavailable`] after a warning is logged.

mod error;
mod models;
mod neo4j;
pub mod queries;
mod reader;

pub use error::GraphError;
pub use models::{
    Ability, ActiveStudent, Activity, ChapterNode, GraphCase, KnowledgeGraph, KnowledgeMastery,
    KnowledgePointHit, KnowledgePointNode, Mastery, ModuleLearningRecord, ModuleNode,
    ModuleOverallStats, ModuleRef, ModuleStats, ModuleSummary, OverallLearningRecord,
    OverallTotals, StudentLearningRecord, StudentModuleStats, StudentRef, StudentSummary,
    DEFAULT_IMPORTANCE, MASTERY_THRESHOLD,
};
pub use neo4j::Neo4jSource;
pub use queries::Statement;
pub use reader::GraphReader;

use async_trait::async_trait;
use serde::Serialize;

/// One result row keyed by column name.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Something that can run a [`Statement`].
#[async_trait]
pub trait GraphSource: Send + Sync {
    async fn run(&self, statement: &Statement) -> Result<Vec<Record>, GraphError>;
}

/// Outcome of a graph read.
///
/// Serializes as `{"status": "found", "data": ...}`, `{"status": "empty"}` or
/// `{"status": "unavailable"}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Fetched<T> {
    Found(T),
    /// The query ran and matched nothing.
    Empty,
    /// No connection, or the query failed.
    Unavailable,
}

impl<T> Fetched<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_found(&self) -> Option<&T> {
        match self {
            Self::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        match self {
            Self::Found(value) => Fetched::Found(f(value)),
            Self::Empty => Fetched::Empty,
            Self::Unavailable => Fetched::Unavailable,
        }
    }
}

impl<T: Default> Fetched<T> {
    /// The found value, or the empty default for both other outcomes.
    pub fn unwrap_or_default(self) -> T {
        self.found().unwrap_or_default()
    }
}

impl<T> From<Option<T>> for Fetched<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Self::Found)
    }
}

impl<T> Fetched<Vec<T>> {
    /// `Empty` for zero rows.
    pub fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            Self::Empty
        } else {
            Self::Found(rows)
        }
    }
}
