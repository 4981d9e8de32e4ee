use std::time::Instant;

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;
use tracing::info;

use crate::domain::use_cases::answer_query::{
    AnswerQueryError, AnswerQueryRequest, AnswerQueryUseCase,
};
use crate::helper::error_chain_fmt;
use crate::routes::cors::CORS_ALLOW_ORIGIN;

/// `POST /baikal-librarian` — grounded, citation-bearing answer to a scoped
/// natural-language query.
#[tracing::instrument(name = "Answer query handler", skip(use_case, body))]
pub async fn answer_query(
    use_case: web::Data<AnswerQueryUseCase>,
    body: web::Json<BodyData>,
) -> Result<HttpResponse, LibrarianError> {
    let started_at = Instant::now();

    let BodyData {
        query,
        org_id,
        project_id,
        vertical_id,
        match_threshold,
        match_count,
    } = body.into_inner();

    let query = query.unwrap_or_default().trim().to_string();
    if query.is_empty() {
        return Err(LibrarianError::EmptyQuery);
    }

    let result = use_case
        .execute(AnswerQueryRequest {
            query,
            org_id,
            project_id,
            vertical_id,
            match_threshold: match_threshold.unwrap_or_else(|| use_case.default_match_threshold()),
            match_count: match_count.unwrap_or_else(|| use_case.default_match_count()),
        })
        .await?;

    let processing_time_ms = started_at.elapsed().as_millis() as u64;
    info!(
        processing_time_ms,
        documents_found = result.documents_found,
        knowledge_type = ?result.knowledge_type,
        "Answered query"
    );

    Ok(HttpResponse::Ok()
        .insert_header(CORS_ALLOW_ORIGIN)
        .json(json!({
            "response": result.response,
            "sources": result.sources,
            "knowledge_type": result.knowledge_type,
            "status": "success",
            "processing_time_ms": processing_time_ms,
            "documents_found": result.documents_found,
            "model": result.model,
            "embedding_model": result.embedding_model,
        })))
}

/// 405 reply for any non-POST, non-OPTIONS method, sent before body parsing
pub async fn librarian_method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header(CORS_ALLOW_ORIGIN)
        .json(json!({
            "error": "Méthode non autorisée",
            "status": "error",
            "response": null,
            "sources": [],
        }))
}

#[derive(Debug, serde::Deserialize)]
pub struct BodyData {
    pub query: Option<String>,
    pub org_id: Option<String>,
    pub project_id: Option<String>,
    pub vertical_id: Option<String>,
    pub match_threshold: Option<f64>,
    pub match_count: Option<u32>,
}

#[derive(thiserror::Error)]
pub enum LibrarianError {
    #[error("Le paramètre `query` est requis")]
    EmptyQuery,
    #[error(transparent)]
    PipelineError(#[from] AnswerQueryError),
    #[error(transparent)]
    InternalError(#[from] anyhow::Error),
}

impl std::fmt::Debug for LibrarianError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for LibrarianError {
    fn status_code(&self) -> StatusCode {
        match self {
            LibrarianError::EmptyQuery => StatusCode::BAD_REQUEST,
            LibrarianError::PipelineError(_) | LibrarianError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    #[tracing::instrument(name = "Response error from answer query handler", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .insert_header(CORS_ALLOW_ORIGIN)
            .json(json!({
                "error": self.to_string(),
                "status": "error",
                "response": null,
                "sources": [],
            }))
    }
}
