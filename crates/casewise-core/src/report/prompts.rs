//! Prompt templates for learning reports.
//!
//! Builders are pure: the same record always yields the same text.

use crate::graph::{
    Ability, ActiveStudent, Activity, KnowledgeMastery, Mastery, ModuleLearningRecord,
    ModuleStats, OverallLearningRecord, StudentLearningRecord, StudentModuleStats,
};

use super::{ReportKind, StatisticsBundle};

/// Recent activities listed in a personal prompt.
pub const ACTIVITY_PREVIEW: usize = 10;
/// Mastery records listed in a personal prompt.
pub const MASTERY_PREVIEW: usize = 10;
/// Knowledge points listed in a module prompt.
pub const MODULE_KP_PREVIEW: usize = 20;
/// Students listed in a module prompt.
pub const STUDENT_STATS_PREVIEW: usize = 10;
/// Entries listed per ranking in an overall prompt.
pub const TOP_PREVIEW: usize = 10;

const NOT_AVAILABLE: &str = "N/A";

pub const PERSONAL_SYSTEM_PROMPT: &str = "You are an experienced management instructor who analyzes student learning data and gives professional, practical guidance.";

pub const MODULE_SYSTEM_PROMPT: &str = "You are an experienced management instructor who evaluates how well a course module is taught and recommends concrete teaching improvements.";

pub const OVERALL_SYSTEM_PROMPT: &str = "You are an experienced management instructor and teaching administrator who analyzes course-wide learning data and proposes strategic teaching improvements.";

/// System role for a report kind.
pub fn system_prompt(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Personal => PERSONAL_SYSTEM_PROMPT,
        ReportKind::Module => MODULE_SYSTEM_PROMPT,
        ReportKind::Overall => OVERALL_SYSTEM_PROMPT,
    }
}

/// Builds the user prompt for a statistics bundle.
pub fn build_prompt(bundle: &StatisticsBundle) -> String {
    match bundle {
        StatisticsBundle::Personal(record) => build_personal_prompt(record),
        StatisticsBundle::Module(record) => build_module_prompt(record),
        StatisticsBundle::Overall(record) => build_overall_prompt(record),
    }
}

pub fn build_personal_prompt(record: &StudentLearningRecord) -> String {
    let summary = record.summary();
    let student = &record.student;

    let activities = preview(&record.activities, ACTIVITY_PREVIEW, |a: &Activity| {
        format!(
            "{}: {} (score: {})",
            text(a.activity_type.as_deref()),
            text(a.content_name.as_deref()),
            number(a.score, 1)
        )
    });
    let mastery = preview(&record.mastery, MASTERY_PREVIEW, |m: &Mastery| {
        format!(
            "{}: level {}/5",
            text(m.knowledge_point.as_deref()),
            m.mastery_level.unwrap_or(0)
        )
    });
    let abilities = preview(&record.abilities, record.abilities.len(), |a: &Ability| {
        format!("{}: {}", text(a.ability_name.as_deref()), number(a.ability_score, 1))
    });

    format!(
        r#"Act as a senior management instructor and write a detailed learning analysis report for the student below.

# Student
- Student ID: {id}
- Name: {name}

# Learning overview
- Learning activities: {activity_count}
- Average score: {average}
- Knowledge points with a mastery record: {mastered}
- High mastery (level 3 or above): {high}

# Recent activities (latest {ACTIVITY_PREVIEW})
{activities}

# Knowledge point mastery (first {MASTERY_PREVIEW})
{mastery}

# Abilities
{abilities}

Structure the report as follows:
1. **Performance summary**: overall attitude, frequency and quality of study
2. **Strengths**: knowledge points and abilities the student handles well
3. **Gaps and advice**: what needs work, with specific study advice
4. **Next steps**: what to study next and how

Requirements:
- Keep the tone professional and constructive
- Combine the numbers with a qualitative assessment
- Give advice the student can act on
- Length: 800-1200 words
- Output in Markdown"#,
        id = student.student_id,
        name = text(student.name.as_deref()),
        activity_count = summary.activity_count,
        average = number(Some(summary.average_score), 2),
        mastered = summary.mastered_count,
        high = summary.high_mastery_count,
    )
}

pub fn build_module_prompt(record: &ModuleLearningRecord) -> String {
    let overall = &record.overall;

    let knowledge_points = preview(&record.knowledge_points, MODULE_KP_PREVIEW, |kp: &String| {
        kp.clone()
    });
    let students = preview(
        &record.student_stats,
        STUDENT_STATS_PREVIEW,
        |s: &StudentModuleStats| {
            format!(
                "{}: {} knowledge points learned, average score {}",
                text(s.student_name.as_deref()),
                s.learned_count,
                number(s.avg_score, 1)
            )
        },
    );

    format!(
        r#"Act as a senior management instructor and write a learning analysis report for the course module below.

# Module
- Name: {name}
- Knowledge points: {kp_count}

# Module statistics
- Participating students: {student_count}
- Learning activities: {total_activities}
- Average score: {average}

# Knowledge points
{knowledge_points}

# Students (top {STUDENT_STATS_PREVIEW} by knowledge points learned)
{students}

Structure the report as follows:
1. **Module overview**: overall engagement with the module
2. **Learning outcomes**: how well students master the content
3. **Highlights**: strong students and well-mastered knowledge points
4. **Problems**: common difficulties and weak spots
5. **Teaching advice**: improvements and topics that need attention

Requirements:
- Keep the tone professional and instructive
- Ground the analysis in the numbers
- Give teaching advice that can be put into practice
- Length: 800-1200 words
- Output in Markdown"#,
        name = text(record.module.name.as_deref()),
        kp_count = record.knowledge_points.len(),
        student_count = overall.student_count,
        total_activities = overall.total_activities,
        average = number(overall.avg_score, 2),
    )
}

pub fn build_overall_prompt(record: &OverallLearningRecord) -> String {
    let totals = &record.totals;

    let modules = preview(&record.module_stats, TOP_PREVIEW, |m: &ModuleStats| {
        format!(
            "{}: {} knowledge points, {} students, average score {}",
            text(m.module_name.as_deref()),
            m.kp_count,
            m.student_count,
            number(m.avg_score, 1)
        )
    });
    let active = preview(&record.active_students, TOP_PREVIEW, |s: &ActiveStudent| {
        format!(
            "{}: {} activities, average score {}",
            text(s.student_name.as_deref()),
            s.activity_count,
            number(s.avg_score, 1)
        )
    });
    let mastered = preview(&record.mastered_knowledge, TOP_PREVIEW, |k: &KnowledgeMastery| {
        format!(
            "{}: mastered by {} students, average level {}",
            text(k.knowledge_point.as_deref()),
            k.student_count,
            number(k.avg_level, 1)
        )
    });
    let weak = preview(&record.weak_knowledge, TOP_PREVIEW, |k: &KnowledgeMastery| {
        format!(
            "{}: {} students below level 3, average level {}",
            text(k.knowledge_point.as_deref()),
            k.student_count,
            number(k.avg_level, 1)
        )
    });

    format!(
        r#"Act as a senior management instructor and teaching administrator and write a comprehensive teaching analysis report for the whole management course.

# Totals
- Students: {total_students}
- Knowledge points: {total_kp}
- Learning activities: {total_activities}
- Average score: {average}
- Total study time: {duration} minutes

# Modules
{modules}

# Most active students (top {TOP_PREVIEW})
{active}

# Best mastered knowledge points (top {TOP_PREVIEW})
{mastered}

# Knowledge points that need work (top {TOP_PREVIEW})
{weak}

Structure the report as follows:
1. **Overall situation**: engagement and results across the course
2. **Module comparison**: stronger and weaker modules
3. **Student profile**: study habits and how results are distributed
4. **Knowledge mastery**: what is well understood and what needs focus
5. **Problems**: the main teaching challenges
6. **Recommendations**: course-level improvements that can be implemented

Requirements:
- Keep the tone professional and strategic
- Let the data drive the analysis
- Length: 1200-1500 words
- Output in Markdown"#,
        total_students = totals.total_students,
        total_kp = totals.total_kp,
        total_activities = totals.total_activities,
        average = number(totals.avg_score, 2),
        duration = number(totals.total_duration, 0),
    )
}

/// Bullet list of at most `cap` items, followed by `... and N more` when
/// items were left out.
pub fn preview<T>(items: &[T], cap: usize, line: impl Fn(&T) -> String) -> String {
    if items.is_empty() {
        return "- none recorded".to_string();
    }

    let mut lines: Vec<String> = items
        .iter()
        .take(cap)
        .map(|item| format!("- {}", line(item)))
        .collect();
    if items.len() > cap {
        lines.push(format!("... and {} more", items.len() - cap));
    }
    lines.join("\n")
}

fn text(value: Option<&str>) -> &str {
    match value {
        Some(s) if !s.trim().is_empty() => s,
        _ => NOT_AVAILABLE,
    }
}

fn number(value: Option<f64>, precision: usize) -> String {
    format!("{:.*}", precision, value.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_caps_and_counts_remainder() {
        let items: Vec<u32> = (1..=13).collect();
        let out = preview(&items, 10, |n| n.to_string());
        assert_eq!(out.lines().count(), 11);
        assert!(out.starts_with("- 1\n"));
        assert!(out.ends_with("... and 3 more"));
    }

    #[test]
    fn test_preview_exact_cap_has_no_suffix() {
        let items = vec!["a", "b"];
        assert_eq!(preview(&items, 2, |s| s.to_string()), "- a\n- b");
    }

    #[test]
    fn test_preview_empty() {
        assert_eq!(preview::<u8>(&[], 5, |n| n.to_string()), "- none recorded");
    }

    #[test]
    fn test_missing_values() {
        assert_eq!(text(None), "N/A");
        assert_eq!(text(Some("  ")), "N/A");
        assert_eq!(number(None, 2), "0.00");
        assert_eq!(number(Some(81.256), 1), "81.3");
    }
}
