//! Typed records decoded from graph rows.
//!
//! Every statement has a matching record here. Rows are decoded with serde at
//! the adapter boundary so a schema drift surfaces as an unavailable result
//! instead of a half-filled map further up.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::cases::Difficulty;

/// Importance given to knowledge points that carry none.
pub const DEFAULT_IMPORTANCE: i64 = 3;

/// Mastery level at or above which a knowledge point counts as mastered.
pub const MASTERY_THRESHOLD: i64 = 3;

// ============================================================================
// Content
// ============================================================================

/// A case node with the chapters and knowledge points it links to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphCase {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "de::difficulty")]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, deserialize_with = "de::names")]
    pub related_chapters: Vec<String>,
    #[serde(default, deserialize_with = "de::names")]
    pub related_kps: Vec<String>,
}

/// Module → chapter → knowledge point tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KnowledgeGraph {
    pub modules: Vec<ModuleNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleNode {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub chapters: Vec<ChapterNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterNode {
    pub id: String,
    pub name: Option<String>,
    pub knowledge_points: Vec<KnowledgePointNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KnowledgePointNode {
    pub id: String,
    pub name: Option<String>,
    pub importance: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModuleRow {
    #[serde(deserialize_with = "de::id")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChapterRow {
    #[serde(deserialize_with = "de::id")]
    module_id: String,
    #[serde(deserialize_with = "de::id")]
    id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KnowledgePointRow {
    #[serde(deserialize_with = "de::id")]
    chapter_id: String,
    #[serde(deserialize_with = "de::id")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "default_importance", deserialize_with = "de::importance")]
    importance: i64,
}

impl KnowledgeGraph {
    /// Nest flat module, chapter and knowledge-point rows into a tree.
    ///
    /// Rows keep their query order. Chapters or knowledge points whose parent
    /// is absent are dropped.
    pub(crate) fn assemble(
        modules: Vec<ModuleRow>,
        chapters: Vec<ChapterRow>,
        knowledge_points: Vec<KnowledgePointRow>,
    ) -> Self {
        let mut points_by_chapter: HashMap<String, Vec<KnowledgePointNode>> = HashMap::new();
        for row in knowledge_points {
            points_by_chapter
                .entry(row.chapter_id)
                .or_default()
                .push(KnowledgePointNode {
                    id: row.id,
                    name: row.name,
                    importance: row.importance,
                });
        }

        let mut chapters_by_module: HashMap<String, Vec<ChapterNode>> = HashMap::new();
        for row in chapters {
            let knowledge_points = points_by_chapter.get(&row.id).cloned().unwrap_or_default();
            chapters_by_module
                .entry(row.module_id)
                .or_default()
                .push(ChapterNode {
                    id: row.id,
                    name: row.name,
                    knowledge_points,
                });
        }

        let modules = modules
            .into_iter()
            .map(|row| ModuleNode {
                chapters: chapters_by_module.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                description: row.description,
            })
            .collect();

        Self { modules }
    }

    pub fn chapter_count(&self) -> usize {
        self.modules.iter().map(|m| m.chapters.len()).sum()
    }

    pub fn knowledge_point_count(&self) -> usize {
        self.modules
            .iter()
            .flat_map(|m| &m.chapters)
            .map(|c| c.knowledge_points.len())
            .sum()
    }
}

/// Per-module chapter and knowledge-point counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleSummary {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub chapter_count: u64,
    pub kp_count: u64,
}

/// A knowledge point matched by name, with its chapter and module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgePointHit {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_importance", deserialize_with = "de::importance")]
    pub importance: i64,
    #[serde(default)]
    pub chapter_name: Option<String>,
    #[serde(default)]
    pub module_name: Option<String>,
}

// ============================================================================
// Learning analytics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRef {
    #[serde(deserialize_with = "de::id")]
    pub student_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl StudentRef {
    /// Name for display, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.student_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRef {
    #[serde(deserialize_with = "de::id")]
    pub module_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

impl ModuleRef {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.module_id)
    }
}

/// One `LEARNED` edge from a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default, deserialize_with = "de::names")]
    pub node_type: Vec<String>,
    #[serde(default)]
    pub content_name: Option<String>,
    #[serde(default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub score: Option<f64>,
}

/// One `MASTERED` edge from a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mastery {
    #[serde(default)]
    pub knowledge_point: Option<String>,
    #[serde(default, deserialize_with = "de::opt_int")]
    pub mastery_level: Option<i64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// One `HAS_ABILITY` edge from a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    #[serde(default)]
    pub ability_name: Option<String>,
    #[serde(default)]
    pub ability_score: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// Everything recorded about one student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentLearningRecord {
    pub student: StudentRef,
    /// Most recent first, at most 100.
    pub activities: Vec<Activity>,
    pub mastery: Vec<Mastery>,
    pub abilities: Vec<Ability>,
}

/// Headline numbers derived from a [`StudentLearningRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StudentSummary {
    pub activity_count: usize,
    /// Mean over all activities; an unscored activity counts as 0.
    pub average_score: f64,
    pub mastered_count: usize,
    pub high_mastery_count: usize,
}

impl StudentLearningRecord {
    pub fn summary(&self) -> StudentSummary {
        let total: f64 = self.activities.iter().map(|a| a.score.unwrap_or(0.0)).sum();
        let average_score = total / self.activities.len().max(1) as f64;

        StudentSummary {
            activity_count: self.activities.len(),
            average_score,
            mastered_count: self.mastery.len(),
            high_mastery_count: self
                .mastery
                .iter()
                .filter(|m| m.mastery_level.is_some_and(|l| l >= MASTERY_THRESHOLD))
                .count(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct KnowledgePointName {
    #[serde(default)]
    pub(crate) knowledge_point: Option<String>,
}

/// One student's progress within a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentModuleStats {
    #[serde(default)]
    pub student_name: Option<String>,
    pub learned_count: u64,
    #[serde(default)]
    pub avg_score: Option<f64>,
    #[serde(default)]
    pub total_duration: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModuleOverallStats {
    pub total_kp: u64,
    pub student_count: u64,
    pub total_activities: u64,
    #[serde(default)]
    pub avg_score: Option<f64>,
}

/// Everything recorded about one module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleLearningRecord {
    pub module: ModuleRef,
    pub knowledge_points: Vec<String>,
    pub student_stats: Vec<StudentModuleStats>,
    pub overall: ModuleOverallStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallTotals {
    pub total_students: u64,
    pub total_kp: u64,
    pub total_activities: u64,
    #[serde(default)]
    pub avg_score: Option<f64>,
    #[serde(default)]
    pub total_duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleStats {
    #[serde(deserialize_with = "de::id")]
    pub module_id: String,
    #[serde(default)]
    pub module_name: Option<String>,
    pub kp_count: u64,
    pub student_count: u64,
    #[serde(default)]
    pub avg_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveStudent {
    #[serde(default, deserialize_with = "de::id")]
    pub student_id: String,
    #[serde(default)]
    pub student_name: Option<String>,
    pub activity_count: u64,
    #[serde(default)]
    pub avg_score: Option<f64>,
}

/// A knowledge point with how many students sit on one side of the
/// mastery threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeMastery {
    #[serde(default)]
    pub knowledge_point: Option<String>,
    pub student_count: u64,
    #[serde(default)]
    pub avg_level: Option<f64>,
}

/// Course-wide learning statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallLearningRecord {
    pub totals: OverallTotals,
    pub module_stats: Vec<ModuleStats>,
    /// Ten most active students.
    pub active_students: Vec<ActiveStudent>,
    /// Ten most mastered knowledge points (level >= 3).
    pub mastered_knowledge: Vec<KnowledgeMastery>,
    /// Ten weakest knowledge points (level < 3).
    pub weak_knowledge: Vec<KnowledgeMastery>,
}

fn default_importance() -> i64 {
    DEFAULT_IMPORTANCE
}

/// Lenient column readers.
mod de {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::DEFAULT_IMPORTANCE;
    use crate::cases::Difficulty;

    fn text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// String or numeric id; null becomes empty.
    pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(String::new()),
            other => text(other).ok_or_else(|| D::Error::custom("expected a string or numeric id")),
        }
    }

    /// List of strings or numbers; nulls inside the list are skipped.
    pub fn names<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(values.into_iter().filter_map(text).collect())
    }

    pub fn difficulty<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Difficulty>, D::Error> {
        Ok(Option::<Value>::deserialize(deserializer)?
            .as_ref()
            .and_then(Difficulty::from_value))
    }

    /// Integer column that may have been stored as a float.
    pub fn opt_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => Ok(n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64))),
            Some(other) => Err(D::Error::custom(format!("expected a number, got {other}"))),
        }
    }

    pub fn importance<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        Ok(opt_int(deserializer)?.unwrap_or(DEFAULT_IMPORTANCE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_null_importance_defaults() {
        let hit: KnowledgePointHit = decode(json!({
            "id": "kp1", "name": "SWOT", "importance": null,
            "chapter_name": null, "module_name": null
        }));
        assert_eq!(hit.importance, DEFAULT_IMPORTANCE);

        let hit: KnowledgePointHit = decode(json!({
            "id": 7, "name": "PEST", "importance": 5.0,
            "chapter_name": "Environment", "module_name": "Strategy"
        }));
        assert_eq!(hit.id, "7");
        assert_eq!(hit.importance, 5);
    }

    #[test]
    fn test_graph_case_lenient_columns() {
        let case: GraphCase = decode(json!({
            "id": "G1", "title": null, "category": "Strategy",
            "difficulty": 3, "content": null,
            "related_chapters": ["Ch1"], "related_kps": [1, "kp2", null]
        }));
        assert_eq!(case.difficulty, Some(Difficulty::High));
        assert_eq!(case.related_kps, vec!["1", "kp2"]);
    }

    #[test]
    fn test_assemble_nests_rows() {
        let modules: Vec<ModuleRow> = decode(json!([
            {"id": "M1", "name": "Strategy", "description": null},
            {"id": "M2", "name": "Finance", "description": "Money"}
        ]));
        let chapters: Vec<ChapterRow> = decode(json!([
            {"module_id": "M1", "id": "C1", "name": "Analysis"},
            {"module_id": "M1", "id": "C2", "name": "Choice"},
            {"module_id": "M9", "id": "C9", "name": "Orphan"}
        ]));
        let points: Vec<KnowledgePointRow> = decode(json!([
            {"chapter_id": "C1", "id": "K1", "name": "SWOT", "importance": null},
            {"chapter_id": "C1", "id": "K2", "name": "PEST", "importance": 4},
            {"chapter_id": "C2", "id": "K3", "name": "Ansoff", "importance": 2}
        ]));

        let graph = KnowledgeGraph::assemble(modules, chapters, points);
        assert_eq!(graph.modules.len(), 2);
        assert_eq!(graph.chapter_count(), 2);
        assert_eq!(graph.knowledge_point_count(), 3);
        assert_eq!(graph.modules[0].chapters[0].knowledge_points[0].importance, 3);
        assert!(graph.modules[1].chapters.is_empty());
    }

    #[test]
    fn test_student_summary() {
        let record = StudentLearningRecord {
            student: StudentRef {
                student_id: "S1".into(),
                name: None,
            },
            activities: decode(json!([
                {"node_type": ["KnowledgePoint"], "score": 80.0},
                {"node_type": ["KnowledgePoint"], "score": null},
                {"node_type": ["Case"], "score": 90}
            ])),
            mastery: decode(json!([
                {"knowledge_point": "A", "mastery_level": 4},
                {"knowledge_point": "B", "mastery_level": 3},
                {"knowledge_point": "C", "mastery_level": 1},
                {"knowledge_point": "D", "mastery_level": null}
            ])),
            abilities: Vec::new(),
        };

        let summary = record.summary();
        assert_eq!(summary.activity_count, 3);
        assert!((summary.average_score - 170.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.mastered_count, 4);
        assert_eq!(summary.high_mastery_count, 2);
        assert_eq!(record.student.display_name(), "S1");
    }
}
