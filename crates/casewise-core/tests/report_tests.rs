use async_trait::async_trait;
use casewise_core::graph::{
    Activity, GraphReader, Mastery, ModuleLearningRecord, ModuleOverallStats, ModuleRef,
    OverallLearningRecord, OverallTotals, StudentLearningRecord, StudentRef,
};
use casewise_core::llm::{CompletionOptions, LLMError, LLM};
use casewise_core::report::prompts::{build_prompt, system_prompt};
use casewise_core::report::{
    report_file_name, save_report, DraftStatus, ReportDrafter, ReportKind, ReportRequest,
    ReportSettings,
};
use casewise_core::{Fetched, StatisticsBundle};
use chrono::NaiveDate;
use std::sync::Mutex;

/// Records the last call and answers with a fixed text.
#[derive(Default)]
struct EchoLLM {
    last: Mutex<Option<(Option<String>, String, CompletionOptions)>>,
}

#[async_trait]
impl LLM for EchoLLM {
    async fn complete_with_options(
        &self,
        system: Option<&str>,
        prompt: &str,
        options: &CompletionOptions,
    ) -> Result<String, LLMError> {
        *self.last.lock().unwrap() = Some((system.map(String::from), prompt.to_string(), *options));
        Ok("# Report\n\nAll good.".to_string())
    }

    fn model(&self) -> &str {
        "echo"
    }
}

struct DownLLM;

#[async_trait]
impl LLM for DownLLM {
    async fn complete_with_options(
        &self,
        _system: Option<&str>,
        _prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<String, LLMError> {
        Err(LLMError::ApiError {
            status: 401,
            message: "invalid api key".to_string(),
        })
    }

    fn model(&self) -> &str {
        "down"
    }
}

fn student(activity_count: usize) -> StudentLearningRecord {
    StudentLearningRecord {
        student: StudentRef {
            student_id: "S001".to_string(),
            name: Some("Li Wei".to_string()),
        },
        activities: (0..activity_count)
            .map(|i| Activity {
                node_type: vec!["KnowledgePoint".to_string()],
                content_name: Some(format!("Topic {i}")),
                activity_type: Some("quiz".to_string()),
                timestamp: None,
                duration: Some(10.0),
                score: Some(80.0),
            })
            .collect(),
        mastery: vec![Mastery {
            knowledge_point: Some("SWOT".to_string()),
            mastery_level: Some(4),
            last_updated: None,
        }],
        abilities: Vec::new(),
    }
}

fn module(kp_count: usize) -> ModuleLearningRecord {
    ModuleLearningRecord {
        module: ModuleRef {
            module_id: "M1".to_string(),
            name: Some("Planning".to_string()),
        },
        knowledge_points: (0..kp_count).map(|i| format!("KP {i}")).collect(),
        student_stats: Vec::new(),
        overall: ModuleOverallStats::default(),
    }
}

fn overall() -> OverallLearningRecord {
    OverallLearningRecord {
        totals: OverallTotals {
            total_students: 3,
            ..Default::default()
        },
        module_stats: Vec::new(),
        active_students: Vec::new(),
        mastered_knowledge: Vec::new(),
        weak_knowledge: Vec::new(),
    }
}

#[test]
fn test_prompt_is_deterministic() {
    let bundle = StatisticsBundle::Personal(student(25));
    assert_eq!(build_prompt(&bundle), build_prompt(&bundle.clone()));

    let bundle = StatisticsBundle::Overall(overall());
    assert_eq!(build_prompt(&bundle), build_prompt(&bundle));
}

#[test]
fn test_personal_prompt_caps_activities() {
    let prompt = build_prompt(&StatisticsBundle::Personal(student(25)));

    assert!(prompt.contains("Topic 9"));
    assert!(!prompt.contains("Topic 10"));
    assert!(prompt.contains("... and 15 more"));
    assert!(prompt.contains("- Learning activities: 25"));
    assert!(prompt.contains("- Average score: 80.00"));
    assert!(prompt.contains("- SWOT: level 4/5"));
}

#[test]
fn test_personal_average_counts_unscored_activities() {
    let mut record = student(2);
    record.activities[0].score = Some(90.0);
    record.activities[1].score = None;
    let prompt = build_prompt(&StatisticsBundle::Personal(record));

    assert!(prompt.contains("- Average score: 45.00"));
}

#[test]
fn test_module_prompt_caps_knowledge_points() {
    let prompt = build_prompt(&StatisticsBundle::Module(module(23)));

    assert!(prompt.contains("- KP 19"));
    assert!(!prompt.contains("- KP 20"));
    assert!(prompt.contains("... and 3 more"));
    assert!(prompt.contains("- Knowledge points: 23"));
    assert!(prompt.contains("- Average score: 0.00"));
}

#[test]
fn test_missing_values_render_as_defaults() {
    let mut record = student(0);
    record.student.name = None;
    let prompt = build_prompt(&StatisticsBundle::Personal(record));

    assert!(prompt.contains("- Name: N/A"));
    assert!(prompt.contains("- Average score: 0.00"));
}

#[tokio::test]
async fn test_draft_uses_kind_settings() {
    let drafter = ReportDrafter::new(EchoLLM::default(), ReportSettings::default());
    let bundle = StatisticsBundle::Overall(overall());

    let draft = drafter.draft(&bundle).await;
    assert_eq!(draft.status, DraftStatus::Generated);
    assert_eq!(draft.kind, ReportKind::Overall);
    assert_eq!(draft.text, "# Report\n\nAll good.");
    assert_eq!(draft.model, "echo");

    let last = drafter_last_call(&drafter);
    assert_eq!(last.0.as_deref(), Some(system_prompt(ReportKind::Overall)));
    assert_eq!(last.1, build_prompt(&bundle));
    assert_eq!(last.2.max_tokens, 2500);
    assert!((last.2.temperature - 0.7).abs() < f32::EPSILON);
}

fn drafter_last_call(
    drafter: &ReportDrafter<EchoLLM>,
) -> (Option<String>, String, CompletionOptions) {
    drafter.llm().last.lock().unwrap().clone().unwrap()
}

#[tokio::test]
async fn test_llm_failure_becomes_text() {
    let drafter = ReportDrafter::new(DownLLM, ReportSettings::default());
    let draft = drafter
        .draft(&StatisticsBundle::Personal(student(1)))
        .await;

    assert_eq!(draft.status, DraftStatus::Failed);
    assert!(!draft.is_generated());
    assert!(draft.text.starts_with("Report generation failed:"));
    assert!(draft.text.contains("invalid api key"));
    assert_eq!(draft.subject.as_deref(), Some("Li Wei"));
}

#[tokio::test]
async fn test_offline_graph_skips_llm() {
    let drafter = ReportDrafter::new(EchoLLM::default(), ReportSettings::default());
    let reader = GraphReader::offline();

    let result = drafter
        .draft_from_graph(&reader, &ReportRequest::Overall)
        .await;
    assert_eq!(result, Fetched::Unavailable);
    assert!(drafter.llm().last.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_report_file_names_and_save() {
    let drafter = ReportDrafter::new(EchoLLM::default(), ReportSettings::default());
    let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

    let personal = drafter.draft(&StatisticsBundle::Personal(student(1))).await;
    assert_eq!(
        report_file_name(&personal, date),
        "learning-report_Li Wei_20240301.md"
    );

    let module = drafter.draft(&StatisticsBundle::Module(module(1))).await;
    assert_eq!(report_file_name(&module, date), "module-report_Planning_20240301.md");

    let whole = drafter.draft(&StatisticsBundle::Overall(overall())).await;
    assert_eq!(report_file_name(&whole, date), "overall-report_20240301.md");

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("nested").join("reports");
    let path = save_report(&target, &whole, date).unwrap();
    assert_eq!(path, target.join("overall-report_20240301.md"));
    assert_eq!(std::fs::read_to_string(path).unwrap(), whole.text);
}
