pub mod cases;
pub mod config;
pub mod graph;
pub mod llm;
pub mod report;

pub use cases::{Case, CaseFilter, CaseStore, Difficulty};
pub use config::Config;
pub use graph::{Fetched, GraphReader};
pub use report::{ReportDraft, ReportDrafter, StatisticsBundle};
