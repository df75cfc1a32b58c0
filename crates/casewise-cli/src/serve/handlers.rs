//! HTTP route handlers for the API server.
//!
//! Handlers stay thin and delegate to the case store, graph reader and
//! report drafter held in [`AppState`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use casewise_core::cases::Case;
use casewise_core::graph::{
    GraphCase, KnowledgeGraph, KnowledgePointHit, ModuleRef, ModuleSummary, StudentRef,
};
use casewise_core::llm::LLM;
use casewise_core::report::{ReportDraft, ReportRequest};
use casewise_core::{CaseFilter, Difficulty, Fetched};

use super::models::{ApiError, CaseDetail, CaseQuery, Health, SearchQuery};
use super::AppState;

type AppStateRef = State<Arc<AppState>>;

/// GET `/api/health`
pub async fn health(State(state): AppStateRef) -> Json<Health> {
    Json(Health {
        status: "ok",
        cases: state.cases.len(),
        cases_placeholder: state.cases.is_placeholder(),
        graph_available: state.graph.is_available(),
        model: state.drafter.llm().model().to_string(),
    })
}

// =============================================================================
// Static cases
// =============================================================================

/// GET `/api/cases` - all cases, optionally filtered by `category` and `difficulty`.
pub async fn list_cases(
    State(state): AppStateRef,
    Query(params): Query<CaseQuery>,
) -> Result<Json<Vec<Case>>, ApiError> {
    let mut filters = Vec::new();
    if let Some(category) = params.category {
        filters.push(CaseFilter::Category(category));
    }
    if let Some(difficulty) = params.difficulty {
        let difficulty: Difficulty = difficulty.parse().map_err(ApiError::bad_request)?;
        filters.push(CaseFilter::Difficulty(difficulty));
    }

    let cases = state
        .cases
        .list_all()
        .iter()
        .filter(|c| filters.iter().all(|f| f.matches(c)))
        .cloned()
        .collect();
    Ok(Json(cases))
}

/// GET `/api/cases/{id}`
pub async fn get_case(
    State(state): AppStateRef,
    Path(id): Path<String>,
) -> Result<Json<CaseDetail>, ApiError> {
    let case = state
        .cases
        .get_by_id(&id)
        .ok_or_else(|| ApiError::not_found(format!("no case with id '{id}'")))?;

    Ok(Json(CaseDetail {
        view: case.view(),
        case: case.clone(),
    }))
}

/// GET `/api/categories`
pub async fn categories(State(state): AppStateRef) -> Json<Vec<String>> {
    Json(state.cases.categories().into_iter().map(String::from).collect())
}

// =============================================================================
// Knowledge graph
// =============================================================================

/// GET `/api/graph/cases`
pub async fn graph_cases(State(state): AppStateRef) -> Json<Fetched<Vec<GraphCase>>> {
    Json(state.graph.graph_cases().await)
}

/// GET `/api/graph/cases/{id}`
pub async fn graph_case(
    State(state): AppStateRef,
    Path(id): Path<String>,
) -> Json<Fetched<GraphCase>> {
    Json(state.graph.graph_case(&id).await)
}

/// GET `/api/graph/knowledge`
pub async fn knowledge_graph(State(state): AppStateRef) -> Json<Fetched<KnowledgeGraph>> {
    Json(state.graph.knowledge_graph().await)
}

/// GET `/api/graph/modules`
pub async fn knowledge_modules(State(state): AppStateRef) -> Json<Fetched<Vec<ModuleSummary>>> {
    Json(state.graph.knowledge_modules().await)
}

/// GET `/api/graph/search?q=`
pub async fn search(
    State(state): AppStateRef,
    Query(params): Query<SearchQuery>,
) -> Json<Fetched<Vec<KnowledgePointHit>>> {
    Json(state.graph.search_knowledge_points(&params.q).await)
}

/// GET `/api/students`
pub async fn students(State(state): AppStateRef) -> Json<Fetched<Vec<StudentRef>>> {
    Json(state.graph.students().await)
}

/// GET `/api/learning-modules`
pub async fn learning_modules(State(state): AppStateRef) -> Json<Fetched<Vec<ModuleRef>>> {
    Json(state.graph.learning_modules().await)
}

// =============================================================================
// Reports
// =============================================================================

/// POST `/api/reports/personal/{id}`
pub async fn personal_report(
    State(state): AppStateRef,
    Path(student_id): Path<String>,
) -> Json<Fetched<ReportDraft>> {
    draft(&state, ReportRequest::Personal { student_id }).await
}

/// POST `/api/reports/module/{id}`
pub async fn module_report(
    State(state): AppStateRef,
    Path(module_id): Path<String>,
) -> Json<Fetched<ReportDraft>> {
    draft(&state, ReportRequest::Module { module_id }).await
}

/// POST `/api/reports/overall`
pub async fn overall_report(State(state): AppStateRef) -> Json<Fetched<ReportDraft>> {
    draft(&state, ReportRequest::Overall).await
}

async fn draft(state: &AppState, request: ReportRequest) -> Json<Fetched<ReportDraft>> {
    Json(state.drafter.draft_from_graph(&state.graph, &request).await)
}
