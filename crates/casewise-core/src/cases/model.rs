//! Case records and their display shape.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Title of the first analysis section in the display shape.
pub const CURRENT_STATE_FINDINGS: &str = "Current-State Findings";
/// Title of the second analysis section in the display shape.
pub const DATA_ANALYSIS: &str = "Data Analysis / Problem Identification";
/// Title of the third analysis section in the display shape.
pub const RELATED_THEORY: &str = "Related Theory";

const DEFAULT_TITLE: &str = "Business Case";

const DEFAULT_KEY_POINTS: &[&str] = &[
    "Understand the core problem of the case",
    "Master the analysis methods and tools",
    "Learn how the solution is designed",
    "Summarize the management lessons",
];

const DEFAULT_SOLUTION: &[&str] = &[
    "Current-state analysis",
    "Solution design",
    "Implementation tracking",
];

/// Difficulty tier of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Low,
    #[default]
    Medium,
    High,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Lenient read of a JSON string or number tier.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => s.parse().ok(),
            Value::Number(n) => n.to_string().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    /// Accepts the English tiers, their common synonyms, the Chinese labels
    /// used by older case files and the numeric tiers 1-3.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" | "easy" | "simple" | "简单" | "1" => Ok(Self::Low),
            "medium" | "moderate" | "中等" | "2" => Ok(Self::Medium),
            "high" | "hard" | "difficult" | "困难" | "3" => Ok(Self::High),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A titled list of findings shown in the analysis tab of a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub title: String,
    #[serde(default, deserialize_with = "string_or_list")]
    pub items: Vec<String>,
}

impl AnalysisSection {
    fn new(title: &str, items: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            items,
        }
    }
}

/// A management case study. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Case {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub difficulty: Difficulty,
    /// Basic situation of the company.
    pub situation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Data analysis / problem identification narrative.
    pub analysis: String,
    /// Solution steps; entries wrapped in `【】` are phase headings.
    pub options: Vec<String>,
    pub questions: Vec<String>,
    pub key_points: Vec<String>,
    pub keywords: Vec<String>,
    pub related_theory: Vec<String>,
    pub related_kps: Vec<String>,
    #[serde(skip)]
    heading_override: Option<String>,
    #[serde(skip)]
    legacy_sections: Option<Vec<AnalysisSection>>,
}

impl Case {
    /// Creates a case with the given identity and empty narrative.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            category: category.into(),
            subcategory: None,
            difficulty,
            situation: String::new(),
            background: None,
            analysis: String::new(),
            options: Vec::new(),
            questions: Vec::new(),
            key_points: Vec::new(),
            keywords: Vec::new(),
            related_theory: Vec::new(),
            related_kps: Vec::new(),
            heading_override: None,
            legacy_sections: None,
        }
    }

    /// The built-in case served when the packaged file cannot be used.
    pub fn placeholder() -> Self {
        let mut case = Self::new(
            "C001",
            "Tech Start-up Strategic Management Case",
            "Strategic Management",
            Difficulty::Medium,
        );
        case.situation = "A fast-growing technology start-up must choose which market to \
                          focus on while its founding team disagrees on direction."
            .to_string();
        case
    }

    /// "category - subcategory", or the heading carried by a legacy record.
    pub fn heading(&self) -> String {
        if let Some(heading) = &self.heading_override {
            return heading.clone();
        }
        format!(
            "{} - {}",
            self.category,
            self.subcategory.as_deref().unwrap_or_default()
        )
    }

    /// Adapts the case to its display shape.
    pub fn view(&self) -> CaseView {
        let sections = match &self.legacy_sections {
            Some(sections) => sections.clone(),
            None => vec![
                AnalysisSection::new(CURRENT_STATE_FINDINGS, non_empty(&self.situation)),
                AnalysisSection::new(DATA_ANALYSIS, non_empty(&self.analysis)),
                AnalysisSection::new(RELATED_THEORY, self.related_theory.clone()),
            ],
        };

        let solution = if self.options.is_empty() {
            defaults(DEFAULT_SOLUTION)
        } else {
            self.options.clone()
        };

        let key_points = if self.key_points.is_empty() {
            defaults(DEFAULT_KEY_POINTS)
        } else {
            self.key_points.clone()
        };

        CaseView {
            id: self.id.clone(),
            title: self.title.clone(),
            difficulty: self.difficulty,
            heading: self.heading(),
            situation: self.situation.clone(),
            background: self.background.clone(),
            keywords: self.keywords.clone(),
            sections,
            solution: solution.iter().map(|s| SolutionStep::parse(s)).collect(),
            questions: self.questions.clone(),
            key_points,
        }
    }
}

fn non_empty(text: &str) -> Vec<String> {
    if text.trim().is_empty() {
        Vec::new()
    } else {
        vec![text.to_string()]
    }
}

fn defaults(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// One line of a case's solution plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "lowercase")]
pub enum SolutionStep {
    /// A phase heading such as `【Phase 1: Diagnosis】`.
    Phase(String),
    Step(String),
}

impl SolutionStep {
    fn parse(line: &str) -> Self {
        if line.starts_with('【') && line.contains('】') {
            Self::Phase(line.to_string())
        } else {
            Self::Step(line.to_string())
        }
    }
}

/// Display shape of a case with fixed sub-section labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseView {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub heading: String,
    pub situation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    pub keywords: Vec<String>,
    pub sections: Vec<AnalysisSection>,
    pub solution: Vec<SolutionStep>,
    pub questions: Vec<String>,
    pub key_points: Vec<String>,
}

// ============================================================================
// Raw file records
// ============================================================================

/// A case as it appears in the packaged file, in either the current or the
/// legacy display key shape.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCase {
    id: Option<Value>,
    title: Option<String>,
    category: Option<String>,
    subcategory: Option<String>,
    difficulty: Option<Value>,

    case_info: Option<String>,
    chief_complaint: Option<String>,
    situation: Option<String>,

    background: Option<String>,
    present_illness: Option<String>,

    court_opinion: Option<String>,
    analysis: Option<String>,

    #[serde(deserialize_with = "string_or_list")]
    keywords: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    symptoms: Vec<String>,

    #[serde(deserialize_with = "string_or_list")]
    related_knowledge: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    related_kps: Vec<String>,

    #[serde(deserialize_with = "string_or_list")]
    treatment_plan: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    options: Vec<String>,

    #[serde(deserialize_with = "string_or_list")]
    questions: Vec<String>,
    #[serde(deserialize_with = "string_or_list")]
    key_points: Vec<String>,

    diagnosis: Option<String>,
    diagnosis_analysis: Option<LegacyAnalysis>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LegacyAnalysis {
    clinical_exam: Option<AnalysisSection>,
    radiographic: Option<AnalysisSection>,
    differential: Option<AnalysisSection>,
}

impl LegacyAnalysis {
    fn into_sections(self) -> Vec<AnalysisSection> {
        [self.clinical_exam, self.radiographic, self.differential]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl RawCase {
    /// Converts to a [`Case`]. Returns `None` when the record has no id.
    pub(crate) fn into_case(self) -> Option<Case> {
        let id = match self.id? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        if id.is_empty() {
            return None;
        }

        let difficulty = self
            .difficulty
            .as_ref()
            .and_then(Difficulty::from_value)
            .unwrap_or_default();

        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let mut case = Case::new(id, title, self.category.unwrap_or_default(), difficulty);
        case.subcategory = self.subcategory;
        case.situation = first_text([self.case_info, self.chief_complaint, self.situation]);
        case.background = self.background.or(self.present_illness);
        case.analysis = first_text([self.court_opinion, self.analysis, None]);
        case.keywords = first_list(self.keywords, self.symptoms);
        case.related_theory = self.related_knowledge;
        case.related_kps = self.related_kps;
        case.options = first_list(self.treatment_plan, self.options);
        case.questions = self.questions;
        case.key_points = self.key_points;
        case.heading_override = self.diagnosis;
        case.legacy_sections = self
            .diagnosis_analysis
            .map(LegacyAnalysis::into_sections)
            .filter(|s| !s.is_empty());

        Some(case)
    }
}

fn first_text(candidates: [Option<String>; 3]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default()
}

fn first_list(primary: Vec<String>, fallback: Vec<String>) -> Vec<String> {
    if primary.is_empty() {
        fallback
    } else {
        primary
    }
}

/// Accepts a JSON array or a newline-separated string. Blank lines are dropped.
fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::String(s) => s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    })
}
