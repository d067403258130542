use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::domain::CriterionKey;
use super::report::ReportFormat;
use super::service::{AssessmentService, SessionView};
use super::store::{SessionId, SessionStore};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub score: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub format: ReportFormat,
}

/// Router builder exposing the assessment session lifecycle.
pub fn assessment_router<K, S>(service: Arc<AssessmentService<K, S>>) -> Router
where
    K: CriterionKey,
    S: SessionStore + 'static,
{
    Router::new()
        .route("/api/v1/assessments", post(start_handler::<K, S>))
        .route(
            "/api/v1/assessments/:session_id",
            get(view_handler::<K, S>).delete(discard_handler::<K, S>),
        )
        .route(
            "/api/v1/assessments/:session_id/answer",
            put(answer_handler::<K, S>),
        )
        .route(
            "/api/v1/assessments/:session_id/advance",
            post(advance_handler::<K, S>),
        )
        .route(
            "/api/v1/assessments/:session_id/back",
            post(back_handler::<K, S>),
        )
        .route(
            "/api/v1/assessments/:session_id/report",
            get(report_handler::<K, S>),
        )
        .with_state(service)
}

pub(crate) async fn start_handler<K, S>(
    State(service): State<Arc<AssessmentService<K, S>>>,
) -> Result<(StatusCode, Json<SessionView<K>>), AppError>
where
    K: CriterionKey,
    S: SessionStore + 'static,
{
    let view = service.start()?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub(crate) async fn view_handler<K, S>(
    State(service): State<Arc<AssessmentService<K, S>>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView<K>>, AppError>
where
    K: CriterionKey,
    S: SessionStore + 'static,
{
    Ok(Json(service.view(&SessionId(session_id))?))
}

pub(crate) async fn answer_handler<K, S>(
    State(service): State<Arc<AssessmentService<K, S>>>,
    Path(session_id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionView<K>>, AppError>
where
    K: CriterionKey,
    S: SessionStore + 'static,
{
    Ok(Json(service.answer(&SessionId(session_id), request.score)?))
}

pub(crate) async fn advance_handler<K, S>(
    State(service): State<Arc<AssessmentService<K, S>>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView<K>>, AppError>
where
    K: CriterionKey,
    S: SessionStore + 'static,
{
    Ok(Json(service.advance(&SessionId(session_id))?))
}

pub(crate) async fn back_handler<K, S>(
    State(service): State<Arc<AssessmentService<K, S>>>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionView<K>>, AppError>
where
    K: CriterionKey,
    S: SessionStore + 'static,
{
    Ok(Json(service.back(&SessionId(session_id))?))
}

pub(crate) async fn report_handler<K, S>(
    State(service): State<Arc<AssessmentService<K, S>>>,
    Path(session_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError>
where
    K: CriterionKey,
    S: SessionStore + 'static,
{
    let report = service.report(&SessionId(session_id), Utc::now())?;
    let body = query.format.render(&report)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, query.format.content_type())],
        body,
    )
        .into_response())
}

pub(crate) async fn discard_handler<K, S>(
    State(service): State<Arc<AssessmentService<K, S>>>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    K: CriterionKey,
    S: SessionStore + 'static,
{
    service.reset(&SessionId(session_id))?;
    Ok(StatusCode::NO_CONTENT)
}
