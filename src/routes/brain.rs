use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use serde_json::json;

use crate::domain::use_cases::route_query::RouteQueryUseCase;
use crate::helper::error_chain_fmt;
use crate::ports::GeneratorError;
use crate::routes::cors::CORS_ALLOW_ORIGIN;

/// `POST /baikal-brain` — classifies a query towards one of the two
/// downstream specialists.
#[tracing::instrument(name = "Route query handler", skip(use_case, body))]
pub async fn route_query(
    use_case: web::Data<RouteQueryUseCase>,
    body: web::Json<BodyData>,
) -> Result<HttpResponse, BrainError> {
    let query = body.query.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return Err(BrainError::EmptyQuery);
    }

    let decision = use_case.execute(&query).await?;

    Ok(HttpResponse::Ok()
        .insert_header(CORS_ALLOW_ORIGIN)
        .json(json!({
            "destination": decision.destination,
            "reasoning": decision.reasoning,
            "status": "success",
        })))
}

/// 405 reply for any non-POST, non-OPTIONS method, sent before body parsing
pub async fn brain_method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header(CORS_ALLOW_ORIGIN)
        .json(json!({ "error": "Méthode non autorisée", "status": "error" }))
}

#[derive(Debug, serde::Deserialize)]
pub struct BodyData {
    pub query: Option<String>,
}

#[derive(thiserror::Error)]
pub enum BrainError {
    #[error("Le paramètre `query` est requis")]
    EmptyQuery,
    #[error(transparent)]
    GeneratorError(#[from] GeneratorError),
}

impl std::fmt::Debug for BrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for BrainError {
    fn status_code(&self) -> StatusCode {
        match self {
            BrainError::EmptyQuery => StatusCode::BAD_REQUEST,
            BrainError::GeneratorError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[tracing::instrument(name = "Response error from route query handler", skip(self), fields(error = %self))]
    fn error_response(&self) -> HttpResponse<actix_web::body::BoxBody> {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .insert_header(CORS_ALLOW_ORIGIN)
            .json(json!({ "error": self.to_string(), "status": "error" }))
    }
}
