//! Static case library.
//!
//! Cases are loaded once from a packaged JSON file and never change
//! afterwards. Loading never fails: when the file is missing, malformed or
//! holds no usable record, the store serves a single built-in placeholder so
//! callers always have something to show.

mod model;

pub use model::{
    AnalysisSection, Case, CaseView, Difficulty, SolutionStep, CURRENT_STATE_FINDINGS,
    DATA_ANALYSIS, RELATED_THEORY,
};

use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use model::RawCase;

/// Reasons the packaged case file could not be used.
#[derive(Debug, Error)]
pub enum CaseLoadError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed case file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Case file contains no usable case")]
    NoCases,
}

/// Where the store's cases came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseSource {
    File(PathBuf),
    Inline,
    /// The built-in placeholder, with the reason the real content was rejected.
    Placeholder { reason: String },
}

/// Filter for [`CaseStore::filter_by`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseFilter {
    Category(String),
    Difficulty(Difficulty),
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        match self {
            Self::Category(category) => case.category == *category,
            Self::Difficulty(difficulty) => case.difficulty == *difficulty,
        }
    }
}

/// Read-only, in-memory case library.
#[derive(Debug, Clone)]
pub struct CaseStore {
    cases: Vec<Case>,
    source: CaseSource,
}

impl CaseStore {
    /// Load cases from a JSON file, falling back to the placeholder.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match read_cases(path) {
            Ok(cases) => {
                debug!(path = %path.display(), count = cases.len(), "loaded case library");
                Self {
                    cases,
                    source: CaseSource::File(path.to_path_buf()),
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "falling back to placeholder case");
                Self::placeholder(e.to_string())
            }
        }
    }

    /// Build a store from JSON text, falling back to the placeholder.
    pub fn from_json_str(json: &str) -> Self {
        match parse_cases(json) {
            Ok(cases) => Self {
                cases,
                source: CaseSource::Inline,
            },
            Err(e) => {
                warn!(error = %e, "falling back to placeholder case");
                Self::placeholder(e.to_string())
            }
        }
    }

    /// A store holding only the built-in placeholder case.
    pub fn placeholder(reason: impl Into<String>) -> Self {
        Self {
            cases: vec![Case::placeholder()],
            source: CaseSource::Placeholder {
                reason: reason.into(),
            },
        }
    }

    /// All cases in file order.
    pub fn list_all(&self) -> &[Case] {
        &self.cases
    }

    /// Look up a case by id.
    pub fn get_by_id(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Cases matching the filter, in file order.
    pub fn filter_by(&self, filter: &CaseFilter) -> Vec<&Case> {
        self.cases.iter().filter(|c| filter.matches(c)).collect()
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = self
            .cases
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        categories.sort_unstable();
        categories.dedup();
        categories
    }

    pub fn source(&self) -> &CaseSource {
        &self.source
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.source, CaseSource::Placeholder { .. })
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

fn read_cases(path: &Path) -> Result<Vec<Case>, CaseLoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| CaseLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_cases(&content)
}

fn parse_cases(json: &str) -> Result<Vec<Case>, CaseLoadError> {
    let json = json.strip_prefix('\u{feff}').unwrap_or(json);
    let records: Vec<Value> = serde_json::from_str(json)?;

    let mut cases: Vec<Case> = Vec::with_capacity(records.len());
    let mut seen = HashSet::new();
    for (index, record) in records.into_iter().enumerate() {
        let raw = match serde_json::from_value::<RawCase>(record) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(index, error = %e, "skipped malformed case record");
                continue;
            }
        };
        let Some(case) = raw.into_case() else {
            warn!(index, "skipped case record without an id");
            continue;
        };
        if !seen.insert(case.id.clone()) {
            warn!(index, id = %case.id, "skipped case record with a duplicate id");
            continue;
        }
        cases.push(case);
    }

    if cases.is_empty() {
        return Err(CaseLoadError::NoCases);
    }
    Ok(cases)
}
