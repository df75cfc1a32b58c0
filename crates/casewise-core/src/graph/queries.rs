//! Fixed Cypher statements.
//!
//! Two label vocabularies live in the graph and are deliberately kept apart:
//! course content (cases and the knowledge tree) uses `gfz_`-prefixed labels,
//! learning analytics (students and their progress) uses unprefixed labels.
//! Nothing here maps one onto the other.
//!
//! Identifiers are always bound as parameters, never spliced into the text.

/// A Cypher statement with its declared result columns and bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Short name used in logs.
    pub name: &'static str,
    pub cypher: &'static str,
    /// Columns read from every row, in `RETURN` order.
    pub columns: &'static [&'static str],
    pub params: Vec<(&'static str, String)>,
}

impl Statement {
    const fn new(
        name: &'static str,
        cypher: &'static str,
        columns: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            cypher,
            columns,
            params: Vec::new(),
        }
    }

    /// Bind a string parameter.
    pub fn param(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.push((key, value.into()));
        self
    }
}

// ============================================================================
// Content (gfz_ labels)
// ============================================================================

const CASE_COLUMNS: &[&str] = &[
    "id",
    "title",
    "category",
    "difficulty",
    "content",
    "related_chapters",
    "related_kps",
];

pub fn graph_cases() -> Statement {
    Statement::new(
        "graph_cases",
        r#"
        MATCH (c:gfz_Case)
        OPTIONAL MATCH (c)-[:RELATED_TO_CHAPTER]->(ch:gfz_Chapter)
        OPTIONAL MATCH (c)-[:RELATED_TO_KP]->(kp:gfz_KnowledgePoint)
        RETURN c.id AS id, c.title AS title, c.category AS category,
               c.difficulty AS difficulty, c.content AS content,
               collect(DISTINCT ch.name) AS related_chapters,
               collect(DISTINCT kp.id) AS related_kps
        ORDER BY id
        "#,
        CASE_COLUMNS,
    )
}

pub fn graph_case(case_id: &str) -> Statement {
    Statement::new(
        "graph_case",
        r#"
        MATCH (c:gfz_Case {id: $case_id})
        OPTIONAL MATCH (c)-[:RELATED_TO_CHAPTER]->(ch:gfz_Chapter)
        OPTIONAL MATCH (c)-[:RELATED_TO_KP]->(kp:gfz_KnowledgePoint)
        RETURN c.id AS id, c.title AS title, c.category AS category,
               c.difficulty AS difficulty, c.content AS content,
               collect(DISTINCT ch.name) AS related_chapters,
               collect(DISTINCT kp.id) AS related_kps
        "#,
        CASE_COLUMNS,
    )
    .param("case_id", case_id)
}

pub fn tree_modules() -> Statement {
    Statement::new(
        "tree_modules",
        r#"
        MATCH (m:gfz_Module)
        RETURN m.id AS id, m.name AS name, m.description AS description
        ORDER BY id
        "#,
        &["id", "name", "description"],
    )
}

pub fn tree_chapters() -> Statement {
    Statement::new(
        "tree_chapters",
        r#"
        MATCH (m:gfz_Module)-[:CONTAINS]->(c:gfz_Chapter)
        RETURN m.id AS module_id, c.id AS id, c.name AS name
        ORDER BY id
        "#,
        &["module_id", "id", "name"],
    )
}

pub fn tree_knowledge_points() -> Statement {
    Statement::new(
        "tree_knowledge_points",
        r#"
        MATCH (c:gfz_Chapter)-[:CONTAINS]->(k:gfz_KnowledgePoint)
        RETURN c.id AS chapter_id, k.id AS id, k.name AS name, k.importance AS importance
        ORDER BY id
        "#,
        &["chapter_id", "id", "name", "importance"],
    )
}

pub fn knowledge_modules() -> Statement {
    Statement::new(
        "knowledge_modules",
        r#"
        MATCH (m:gfz_Module)
        OPTIONAL MATCH (m)-[:CONTAINS]->(c:gfz_Chapter)
        OPTIONAL MATCH (c)-[:CONTAINS]->(k:gfz_KnowledgePoint)
        RETURN m.id AS id, m.name AS name,
               count(DISTINCT c) AS chapter_count,
               count(DISTINCT k) AS kp_count
        ORDER BY id
        "#,
        &["id", "name", "chapter_count", "kp_count"],
    )
}

/// Maximum hits returned by a knowledge-point search.
pub const SEARCH_LIMIT: usize = 20;

pub fn search_knowledge_points(keyword: &str) -> Statement {
    Statement::new(
        "search_knowledge_points",
        r#"
        MATCH (k:gfz_KnowledgePoint)
        WHERE k.name CONTAINS $keyword
        OPTIONAL MATCH (c:gfz_Chapter)-[:CONTAINS]->(k)
        OPTIONAL MATCH (m:gfz_Module)-[:CONTAINS]->(c)
        RETURN k.id AS id, k.name AS name, k.importance AS importance,
               c.name AS chapter_name, m.name AS module_name
        ORDER BY id
        LIMIT 20
        "#,
        &["id", "name", "importance", "chapter_name", "module_name"],
    )
    .param("keyword", keyword)
}

// ============================================================================
// Learning analytics (unprefixed labels)
// ============================================================================

pub fn students() -> Statement {
    Statement::new(
        "students",
        r#"
        MATCH (s:Student)
        RETURN s.id AS student_id, s.name AS name
        ORDER BY student_id
        "#,
        &["student_id", "name"],
    )
}

pub fn learning_modules() -> Statement {
    Statement::new(
        "learning_modules",
        r#"
        MATCH (m:Module)
        RETURN m.id AS module_id, m.name AS name
        ORDER BY module_id
        "#,
        &["module_id", "name"],
    )
}

pub fn student_info(student_id: &str) -> Statement {
    Statement::new(
        "student_info",
        r#"
        MATCH (s:Student {id: $student_id})
        RETURN s.id AS student_id, s.name AS name
        "#,
        &["student_id", "name"],
    )
    .param("student_id", student_id)
}

pub fn student_activities(student_id: &str) -> Statement {
    Statement::new(
        "student_activities",
        r#"
        MATCH (s:Student {id: $student_id})-[r:LEARNED]->(k)
        RETURN labels(k) AS node_type,
               k.name AS content_name,
               r.activity_type AS activity_type,
               toString(r.timestamp) AS timestamp,
               r.duration AS duration,
               r.score AS score
        ORDER BY r.timestamp DESC
        LIMIT 100
        "#,
        &["node_type", "content_name", "activity_type", "timestamp", "duration", "score"],
    )
    .param("student_id", student_id)
}

pub fn student_mastery(student_id: &str) -> Statement {
    Statement::new(
        "student_mastery",
        r#"
        MATCH (s:Student {id: $student_id})-[r:MASTERED]->(k:KnowledgePoint)
        RETURN k.name AS knowledge_point,
               r.level AS mastery_level,
               toString(r.last_updated) AS last_updated
        ORDER BY r.last_updated DESC
        "#,
        &["knowledge_point", "mastery_level", "last_updated"],
    )
    .param("student_id", student_id)
}

pub fn student_abilities(student_id: &str) -> Statement {
    Statement::new(
        "student_abilities",
        r#"
        MATCH (s:Student {id: $student_id})-[r:HAS_ABILITY]->(a)
        WHERE labels(a)[0] CONTAINS 'Ability'
        RETURN a.name AS ability_name,
               r.score AS ability_score,
               toString(r.last_updated) AS last_updated
        "#,
        &["ability_name", "ability_score", "last_updated"],
    )
    .param("student_id", student_id)
}

pub fn module_info(module_id: &str) -> Statement {
    Statement::new(
        "module_info",
        r#"
        MATCH (m:Module {id: $module_id})
        RETURN m.id AS module_id, m.name AS name
        "#,
        &["module_id", "name"],
    )
    .param("module_id", module_id)
}

pub fn module_knowledge_points(module_id: &str) -> Statement {
    Statement::new(
        "module_knowledge_points",
        r#"
        MATCH (m:Module {id: $module_id})-[:CONTAINS*]->(k:KnowledgePoint)
        RETURN DISTINCT k.name AS knowledge_point
        "#,
        &["knowledge_point"],
    )
    .param("module_id", module_id)
}

pub fn module_student_stats(module_id: &str) -> Statement {
    Statement::new(
        "module_student_stats",
        r#"
        MATCH (m:Module {id: $module_id})-[:CONTAINS*]->(k:KnowledgePoint)
        MATCH (s:Student)-[r:LEARNED]->(k)
        RETURN s.name AS student_name,
               count(DISTINCT k) AS learned_count,
               avg(r.score) AS avg_score,
               sum(r.duration) AS total_duration
        ORDER BY learned_count DESC
        "#,
        &["student_name", "learned_count", "avg_score", "total_duration"],
    )
    .param("module_id", module_id)
}

pub fn module_overall_stats(module_id: &str) -> Statement {
    Statement::new(
        "module_overall_stats",
        r#"
        MATCH (m:Module {id: $module_id})-[:CONTAINS*]->(k:KnowledgePoint)
        WITH count(DISTINCT k) AS total_kp
        MATCH (m:Module {id: $module_id})-[:CONTAINS*]->(k:KnowledgePoint)
        OPTIONAL MATCH (s:Student)-[r:LEARNED]->(k)
        RETURN total_kp,
               count(DISTINCT s) AS student_count,
               count(r) AS total_activities,
               avg(r.score) AS avg_score
        "#,
        &["total_kp", "student_count", "total_activities", "avg_score"],
    )
    .param("module_id", module_id)
}

pub fn overall_totals() -> Statement {
    Statement::new(
        "overall_totals",
        r#"
        OPTIONAL MATCH (:Student)-[r:LEARNED]->(:KnowledgePoint)
        RETURN COUNT { (:Student) } AS total_students,
               COUNT { (:KnowledgePoint) } AS total_kp,
               count(r) AS total_activities,
               avg(r.score) AS avg_score,
               sum(r.duration) AS total_duration
        "#,
        &["total_students", "total_kp", "total_activities", "avg_score", "total_duration"],
    )
}

pub fn overall_module_stats() -> Statement {
    Statement::new(
        "overall_module_stats",
        r#"
        MATCH (m:Module)
        OPTIONAL MATCH (m)-[:CONTAINS*]->(k:KnowledgePoint)
        OPTIONAL MATCH (s:Student)-[r:LEARNED]->(k)
        RETURN m.id AS module_id,
               m.name AS module_name,
               count(DISTINCT k) AS kp_count,
               count(DISTINCT s) AS student_count,
               avg(r.score) AS avg_score
        ORDER BY module_id
        "#,
        &["module_id", "module_name", "kp_count", "student_count", "avg_score"],
    )
}

pub fn overall_active_students() -> Statement {
    Statement::new(
        "overall_active_students",
        r#"
        MATCH (s:Student)-[r:LEARNED]->()
        RETURN s.id AS student_id,
               s.name AS student_name,
               count(r) AS activity_count,
               avg(r.score) AS avg_score
        ORDER BY activity_count DESC
        LIMIT 10
        "#,
        &["student_id", "student_name", "activity_count", "avg_score"],
    )
}

pub fn overall_mastered_knowledge() -> Statement {
    Statement::new(
        "overall_mastered_knowledge",
        r#"
        MATCH (s:Student)-[r:MASTERED]->(k:KnowledgePoint)
        WHERE r.level >= 3
        RETURN k.name AS knowledge_point,
               count(s) AS student_count,
               avg(r.level) AS avg_level
        ORDER BY student_count DESC, avg_level DESC
        LIMIT 10
        "#,
        &["knowledge_point", "student_count", "avg_level"],
    )
}

pub fn overall_weak_knowledge() -> Statement {
    Statement::new(
        "overall_weak_knowledge",
        r#"
        MATCH (s:Student)-[r:MASTERED]->(k:KnowledgePoint)
        WHERE r.level < 3
        RETURN k.name AS knowledge_point,
               count(s) AS student_count,
               avg(r.level) AS avg_level
        ORDER BY student_count DESC, avg_level ASC
        LIMIT 10
        "#,
        &["knowledge_point", "student_count", "avg_level"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_bound_not_spliced() {
        let evil = "x'}) DETACH DELETE n //";
        for statement in [
            graph_case(evil),
            search_knowledge_points(evil),
            student_info(evil),
            student_activities(evil),
            module_info(evil),
            module_overall_stats(evil),
        ] {
            assert!(!statement.cypher.contains(evil), "{} splices input", statement.name);
            assert_eq!(statement.params.len(), 1);
            assert_eq!(statement.params[0].1, evil);
        }
    }

    #[test]
    fn test_vocabularies_stay_separate() {
        for statement in [graph_cases(), tree_modules(), knowledge_modules()] {
            assert!(statement.cypher.contains(":gfz_"));
        }
        for statement in [students(), learning_modules(), overall_module_stats()] {
            assert!(!statement.cypher.contains("gfz_"));
        }
    }

    #[test]
    fn test_columns_are_returned() {
        for statement in [graph_cases(), overall_totals(), student_activities("s1")] {
            for column in statement.columns {
                assert!(
                    statement.cypher.contains(&format!("AS {column}"))
                        || statement.cypher.contains(&format!("RETURN {column}")),
                    "{} does not return {column}",
                    statement.name
                );
            }
        }
    }
}
