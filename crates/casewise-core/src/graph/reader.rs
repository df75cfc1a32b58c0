use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::error::GraphError;
use super::models::{
    ChapterRow, GraphCase, KnowledgeGraph, KnowledgePointHit, KnowledgePointName,
    KnowledgePointRow, ModuleLearningRecord, ModuleRef, ModuleRow, ModuleSummary,
    OverallLearningRecord, OverallTotals, StudentLearningRecord, StudentRef,
};
use super::neo4j::Neo4jSource;
use super::queries::{self, Statement};
use super::{Fetched, GraphSource};
use crate::config::GraphConfig;

/// Fail-open reader over an optional graph connection.
///
/// Built once by the application and shared. A reader whose connection
/// attempt failed stays offline; it does not retry.
#[derive(Clone)]
pub struct GraphReader {
    source: Option<Arc<dyn GraphSource>>,
}

impl fmt::Debug for GraphReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphReader")
            .field("available", &self.is_available())
            .finish()
    }
}

impl GraphReader {
    pub fn new(source: Arc<dyn GraphSource>) -> Self {
        Self {
            source: Some(source),
        }
    }

    /// A reader that answers every query with [`Fetched::Unavailable`].
    pub fn offline() -> Self {
        Self { source: None }
    }

    /// Connect using the graph settings, going offline on any failure.
    pub async fn connect(config: &GraphConfig) -> Self {
        if !config.is_configured() {
            info!("graph database not configured; graph views disabled");
            return Self::offline();
        }

        match Neo4jSource::connect(config).await {
            Ok(source) => Self::new(Arc::new(source)),
            Err(e) => {
                warn!(error = %e, "graph database unreachable; graph views disabled");
                Self::offline()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.source.is_some()
    }

    // ------------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------------

    /// All case nodes with their related chapters and knowledge points.
    pub async fn graph_cases(&self) -> Fetched<Vec<GraphCase>> {
        let result = self.rows(queries::graph_cases()).await.map(Fetched::from_rows);
        settle("graph_cases", result)
    }

    pub async fn graph_case(&self, case_id: &str) -> Fetched<GraphCase> {
        let result = self
            .rows(queries::graph_case(case_id))
            .await
            .map(|rows| rows.into_iter().next().into());
        settle("graph_case", result)
    }

    /// The module → chapter → knowledge point tree.
    pub async fn knowledge_graph(&self) -> Fetched<KnowledgeGraph> {
        settle("knowledge_graph", self.load_knowledge_graph().await)
    }

    pub async fn knowledge_modules(&self) -> Fetched<Vec<ModuleSummary>> {
        let result = self
            .rows(queries::knowledge_modules())
            .await
            .map(Fetched::from_rows);
        settle("knowledge_modules", result)
    }

    /// Knowledge points whose name contains `keyword`, at most twenty.
    /// A blank keyword matches nothing.
    pub async fn search_knowledge_points(&self, keyword: &str) -> Fetched<Vec<KnowledgePointHit>> {
        settle("search_knowledge_points", self.load_search(keyword).await)
    }

    // ------------------------------------------------------------------------
    // Learning analytics
    // ------------------------------------------------------------------------

    pub async fn students(&self) -> Fetched<Vec<StudentRef>> {
        let result = self.rows(queries::students()).await.map(Fetched::from_rows);
        settle("students", result)
    }

    pub async fn learning_modules(&self) -> Fetched<Vec<ModuleRef>> {
        let result = self
            .rows(queries::learning_modules())
            .await
            .map(Fetched::from_rows);
        settle("learning_modules", result)
    }

    /// Activities, mastery and abilities of one student. `Empty` when the
    /// student does not exist.
    pub async fn student_learning(&self, student_id: &str) -> Fetched<StudentLearningRecord> {
        settle("student_learning", self.load_student(student_id).await)
    }

    /// Knowledge points and per-student progress of one module. `Empty` when
    /// the module does not exist.
    pub async fn module_learning(&self, module_id: &str) -> Fetched<ModuleLearningRecord> {
        settle("module_learning", self.load_module(module_id).await)
    }

    /// Course-wide statistics. `Empty` when no student is recorded.
    pub async fn overall_learning(&self) -> Fetched<OverallLearningRecord> {
        settle("overall_learning", self.load_overall().await)
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn source(&self) -> Result<&Arc<dyn GraphSource>, GraphError> {
        self.source.as_ref().ok_or(GraphError::Unavailable)
    }

    async fn rows<T: DeserializeOwned>(&self, statement: Statement) -> Result<Vec<T>, GraphError> {
        let records = self.source()?.run(&statement).await?;
        records
            .into_iter()
            .map(|record| {
                serde_json::from_value(serde_json::Value::Object(record)).map_err(|e| {
                    GraphError::Decode {
                        statement: statement.name,
                        message: e.to_string(),
                    }
                })
            })
            .collect()
    }

    async fn first<T: DeserializeOwned>(&self, statement: Statement) -> Result<Option<T>, GraphError> {
        Ok(self.rows(statement).await?.into_iter().next())
    }

    async fn load_knowledge_graph(&self) -> Result<Fetched<KnowledgeGraph>, GraphError> {
        let modules: Vec<ModuleRow> = self.rows(queries::tree_modules()).await?;
        if modules.is_empty() {
            return Ok(Fetched::Empty);
        }
        let chapters: Vec<ChapterRow> = self.rows(queries::tree_chapters()).await?;
        let points: Vec<KnowledgePointRow> = self.rows(queries::tree_knowledge_points()).await?;

        Ok(Fetched::Found(KnowledgeGraph::assemble(modules, chapters, points)))
    }

    async fn load_search(&self, keyword: &str) -> Result<Fetched<Vec<KnowledgePointHit>>, GraphError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            self.source()?;
            return Ok(Fetched::Empty);
        }
        let mut hits: Vec<KnowledgePointHit> =
            self.rows(queries::search_knowledge_points(keyword)).await?;
        hits.truncate(queries::SEARCH_LIMIT);
        Ok(Fetched::from_rows(hits))
    }

    async fn load_student(&self, student_id: &str) -> Result<Fetched<StudentLearningRecord>, GraphError> {
        let Some(student) = self.first::<StudentRef>(queries::student_info(student_id)).await? else {
            return Ok(Fetched::Empty);
        };

        let activities = self.rows(queries::student_activities(student_id)).await?;
        let mastery = self.rows(queries::student_mastery(student_id)).await?;
        let abilities = self.rows(queries::student_abilities(student_id)).await?;

        Ok(Fetched::Found(StudentLearningRecord {
            student,
            activities,
            mastery,
            abilities,
        }))
    }

    async fn load_module(&self, module_id: &str) -> Result<Fetched<ModuleLearningRecord>, GraphError> {
        let Some(module) = self.first::<ModuleRef>(queries::module_info(module_id)).await? else {
            return Ok(Fetched::Empty);
        };

        let names: Vec<KnowledgePointName> =
            self.rows(queries::module_knowledge_points(module_id)).await?;
        let student_stats = self.rows(queries::module_student_stats(module_id)).await?;
        let overall = self
            .first(queries::module_overall_stats(module_id))
            .await?
            .unwrap_or_default();

        Ok(Fetched::Found(ModuleLearningRecord {
            module,
            knowledge_points: names.into_iter().filter_map(|n| n.knowledge_point).collect(),
            student_stats,
            overall,
        }))
    }

    async fn load_overall(&self) -> Result<Fetched<OverallLearningRecord>, GraphError> {
        let totals: OverallTotals = self.first(queries::overall_totals()).await?.unwrap_or_default();
        if totals.total_students == 0 {
            return Ok(Fetched::Empty);
        }

        Ok(Fetched::Found(OverallLearningRecord {
            totals,
            module_stats: self.rows(queries::overall_module_stats()).await?,
            active_students: self.rows(queries::overall_active_students()).await?,
            mastered_knowledge: self.rows(queries::overall_mastered_knowledge()).await?,
            weak_knowledge: self.rows(queries::overall_weak_knowledge()).await?,
        }))
    }
}

/// Collapse an internal result into the fail-open outcome.
fn settle<T>(operation: &'static str, result: Result<Fetched<T>, GraphError>) -> Fetched<T> {
    match result {
        Ok(fetched) => fetched,
        Err(GraphError::Unavailable) => {
            debug!(operation, "graph offline");
            Fetched::Unavailable
        }
        Err(e) => {
            warn!(operation, error = %e, "graph read failed");
            Fetched::Unavailable
        }
    }
}
