//! AI-drafted learning reports.
//!
//! A report is drafted from one [`StatisticsBundle`] with a single LLM call.
//! Drafting never fails outright: an LLM error becomes a short failure text.

mod drafter;
pub mod export;
pub mod prompts;

pub use drafter::{DraftStatus, ReportDraft, ReportDrafter, ReportRequest, ReportSettings};
pub use export::{report_file_name, save_report};

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::graph::{ModuleLearningRecord, OverallLearningRecord, StudentLearningRecord};

/// Errors from saving a report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The three report flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Personal,
    Module,
    Overall,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Module => "module",
            Self::Overall => "overall",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics a report is drafted from.
#[derive(Debug, Clone, PartialEq)]
pub enum StatisticsBundle {
    Personal(StudentLearningRecord),
    Module(ModuleLearningRecord),
    Overall(OverallLearningRecord),
}

impl StatisticsBundle {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Personal(_) => ReportKind::Personal,
            Self::Module(_) => ReportKind::Module,
            Self::Overall(_) => ReportKind::Overall,
        }
    }

    /// Who or what the report is about. `None` for the whole course.
    pub fn subject(&self) -> Option<String> {
        match self {
            Self::Personal(record) => Some(record.student.display_name().to_string()),
            Self::Module(record) => Some(record.module.display_name().to_string()),
            Self::Overall(_) => None,
        }
    }
}
