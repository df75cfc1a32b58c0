use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::graph::{Fetched, GraphReader};
use crate::llm::{CompletionOptions, LLM};

use super::prompts::{build_prompt, system_prompt};
use super::{ReportKind, StatisticsBundle};

/// Sampling settings per report kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportSettings {
    pub temperature: f32,
    pub personal_max_tokens: u32,
    pub module_max_tokens: u32,
    pub overall_max_tokens: u32,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ReportSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            temperature: config.llm.temperature,
            personal_max_tokens: config.report.personal_max_tokens,
            module_max_tokens: config.report.module_max_tokens,
            overall_max_tokens: config.report.overall_max_tokens,
        }
    }

    pub fn options(&self, kind: ReportKind) -> CompletionOptions {
        let max_tokens = match kind {
            ReportKind::Personal => self.personal_max_tokens,
            ReportKind::Module => self.module_max_tokens,
            ReportKind::Overall => self.overall_max_tokens,
        };
        CompletionOptions {
            temperature: self.temperature,
            max_tokens,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftStatus {
    Generated,
    Failed,
}

/// A drafted report, or the reason drafting failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDraft {
    pub kind: ReportKind,
    pub subject: Option<String>,
    pub status: DraftStatus,
    /// Markdown from the model, or a one-line failure message.
    pub text: String,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}

impl ReportDraft {
    pub fn is_generated(&self) -> bool {
        self.status == DraftStatus::Generated
    }
}

/// What to draft a report about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportRequest {
    Personal { student_id: String },
    Module { module_id: String },
    Overall,
}

impl ReportRequest {
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::Personal { .. } => ReportKind::Personal,
            Self::Module { .. } => ReportKind::Module,
            Self::Overall => ReportKind::Overall,
        }
    }
}

/// Drafts learning reports with an LLM.
pub struct ReportDrafter<L: LLM> {
    llm: L,
    settings: ReportSettings,
}

impl<L: LLM> ReportDrafter<L> {
    pub fn new(llm: L, settings: ReportSettings) -> Self {
        Self { llm, settings }
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Draft a report with a single completion call.
    pub async fn draft(&self, bundle: &StatisticsBundle) -> ReportDraft {
        let kind = bundle.kind();
        let prompt = build_prompt(bundle);
        let options = self.settings.options(kind);

        let result = self
            .llm
            .complete_with_options(Some(system_prompt(kind)), &prompt, &options)
            .await;

        let (status, text) = match result {
            Ok(text) => {
                info!(%kind, model = self.llm.model(), "report drafted");
                (DraftStatus::Generated, text)
            }
            Err(e) => {
                warn!(%kind, error = %e, "report drafting failed");
                (DraftStatus::Failed, format!("Report generation failed: {e}"))
            }
        };

        ReportDraft {
            kind,
            subject: bundle.subject(),
            status,
            text,
            model: self.llm.model().to_string(),
            generated_at: Utc::now(),
        }
    }

    /// Read the statistics for `request` and draft a report from them.
    ///
    /// `Empty` when the student or module is unknown, `Unavailable` when the
    /// graph cannot be read. The LLM is not called in either case.
    pub async fn draft_from_graph(
        &self,
        reader: &GraphReader,
        request: &ReportRequest,
    ) -> Fetched<ReportDraft> {
        let bundle = match request {
            ReportRequest::Personal { student_id } => reader
                .student_learning(student_id)
                .await
                .map(StatisticsBundle::Personal),
            ReportRequest::Module { module_id } => reader
                .module_learning(module_id)
                .await
                .map(StatisticsBundle::Module),
            ReportRequest::Overall => reader
                .overall_learning()
                .await
                .map(StatisticsBundle::Overall),
        };

        match bundle {
            Fetched::Found(bundle) => Fetched::Found(self.draft(&bundle).await),
            Fetched::Empty => Fetched::Empty,
            Fetched::Unavailable => Fetched::Unavailable,
        }
    }
}
