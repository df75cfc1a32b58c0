//! Saving drafted reports as Markdown files.

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{ReportDraft, ReportError, ReportKind};

/// File name for a saved report, e.g. `learning-report_Alice_20240301.md`.
pub fn report_file_name(draft: &ReportDraft, date: NaiveDate) -> String {
    let stamp = date.format("%Y%m%d");
    let subject = sanitize(draft.subject.as_deref().unwrap_or_default());

    match draft.kind {
        ReportKind::Personal => format!("learning-report_{subject}_{stamp}.md"),
        ReportKind::Module => format!("module-report_{subject}_{stamp}.md"),
        ReportKind::Overall => format!("overall-report_{stamp}.md"),
    }
}

/// Write the report text into `dir`, creating it if needed.
pub fn save_report(
    dir: impl AsRef<Path>,
    draft: &ReportDraft,
    date: NaiveDate,
) -> Result<PathBuf, ReportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(report_file_name(draft, date));
    fs::write(&path, &draft.text).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), "saved report");
    Ok(path)
}

fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}
