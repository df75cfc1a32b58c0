//! Request and response types for the JSON API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use casewise_core::cases::{Case, CaseView};

// =============================================================================
// Query parameters
// =============================================================================

/// Query parameters for `/api/cases`.
#[derive(Debug, Default, Deserialize)]
pub struct CaseQuery {
    pub category: Option<String>,
    /// low, medium or high (synonyms accepted).
    pub difficulty: Option<String>,
}

/// Query parameters for `/api/graph/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// =============================================================================
// Responses
// =============================================================================

/// A case together with its display shape.
#[derive(Debug, Serialize)]
pub struct CaseDetail {
    pub case: Case,
    pub view: CaseView,
}

/// `/api/health` body.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub cases: usize,
    pub cases_placeholder: bool,
    pub graph_available: bool,
    pub model: String,
}

/// JSON error body with an HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}
