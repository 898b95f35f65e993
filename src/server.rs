use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::assignments::{Assignment, AssignmentFilter, RubricCriterion, RubricRequest};
use crate::behavior::{BehaviorFilter, BehaviorRecord, BehaviorSummary};
use crate::config::Config;
use crate::controllers::{
    AlignmentCheck, AlignmentRequest, AssignmentController, BehaviorController,
    CurriculumController, MaterialController, RemediationController, ResourceController,
    TeacherTools,
};
use crate::error::ToolError;
use crate::materials::{DifferentiatedVersions, StudyMaterial, StudyMaterialFilter};
use crate::remediation::{
    PlanDraft, ProgressNoteRequest, RemediationFilter, RemediationPlan, SuggestionRequest,
};
use crate::standards::{CurriculumFilter, CurriculumStandard};
use crate::store::{DocumentStore, Record};

pub const API_PREFIX: &str = "/api/teacher-tools";

#[derive(Clone)]
pub struct ApiState {
    tools: Arc<TeacherTools>,
}

impl ApiState {
    pub fn new(tools: TeacherTools) -> Self {
        Self {
            tools: Arc::new(tools),
        }
    }
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    message: String,
    errors: Vec<String>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    errors: Vec<String>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: StatusCode::BAD_REQUEST,
            errors: vec![message.clone()],
            message,
        }
    }
}

impl From<ToolError> for ApiError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::Validation(errors) => Self {
                status: StatusCode::BAD_REQUEST,
                message: "validation failed".to_string(),
                errors,
            },
            ToolError::NotFound { .. } => Self {
                status: StatusCode::NOT_FOUND,
                message: err.to_string(),
                errors: Vec::new(),
            },
            ToolError::Store(source) => {
                error!(error = ?source, "request failed");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "server error".to_string(),
                    errors: Vec::new(),
                }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            message: self.message,
            errors: self.errors,
        });
        (self.status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    id: String,
}

pub fn build_router(state: ApiState, permissive_cors: bool) -> Router {
    let api = Router::new()
        .merge(resource_routes::<CurriculumController>("/curriculum"))
        .route("/curriculum/search/criteria", get(search_curriculum))
        .route("/curriculum/check-alignment", post(check_alignment))
        .merge(resource_routes::<AssignmentController>("/assignments"))
        .route("/assignments/search/criteria", get(search_assignments))
        .route("/assignments/generate-rubric", post(generate_rubric))
        .merge(resource_routes::<MaterialController>("/study-materials"))
        .route("/study-materials/search/criteria", get(search_materials))
        .route(
            "/study-materials/differentiate/:material_id",
            post(differentiate_material),
        )
        .merge(resource_routes::<RemediationController>("/remediation-plans"))
        .route("/remediation-plans/search", get(search_plans))
        .route(
            "/remediation-plans/generate-suggestions",
            post(generate_suggestions),
        )
        .route("/remediation-plans/:id/progress-note", post(add_progress_note))
        .merge(resource_routes::<BehaviorController>("/behavior-tracker"))
        .route("/behavior-tracker/search", get(search_behavior))
        .route(
            "/behavior-tracker/summary/student/:student_name",
            get(student_summary),
        );

    let app = Router::new()
        .route("/health", get(health))
        .nest(API_PREFIX, api)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if permissive_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

fn resource_routes<C: ResourceController>(base: &str) -> Router<ApiState> {
    Router::new()
        .route(base, get(list_records::<C>).post(create_record::<C>))
        .route(
            &format!("{base}/:id"),
            get(get_record::<C>)
                .put(update_record::<C>)
                .delete(delete_record::<C>),
        )
}

pub async fn run_server(
    config: Config,
    store: Arc<dyn DocumentStore>,
    bind: SocketAddr,
) -> Result<()> {
    let state = ApiState::new(TeacherTools::new(store, &config));
    let app = build_router(state, config.server.permissive_cors);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed binding {bind}"))?;
    info!("REST API listening on http://{bind}{API_PREFIX}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_records<C: ResourceController>(
    State(state): State<ApiState>,
) -> ApiResult<Vec<Record<C::Doc>>> {
    Ok(Json(C::select(&state.tools).list()?))
}

async fn get_record<C: ResourceController>(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<Record<C::Doc>> {
    Ok(Json(C::select(&state.tools).get(&id)?))
}

async fn create_record<C: ResourceController>(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<C::Doc>, JsonRejection>,
) -> std::result::Result<(StatusCode, Json<Record<C::Doc>>), ApiError> {
    let Json(body) = payload?;
    let created = C::select(&state.tools).create(body)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_record<C: ResourceController>(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<C::Doc>, JsonRejection>,
) -> ApiResult<Record<C::Doc>> {
    let Json(body) = payload?;
    Ok(Json(C::select(&state.tools).update(&id, body)?))
}

async fn delete_record<C: ResourceController>(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> ApiResult<DeletedResponse> {
    let id = C::select(&state.tools).delete(&id)?;
    Ok(Json(DeletedResponse { id }))
}

async fn search_curriculum(
    State(state): State<ApiState>,
    query: std::result::Result<Query<CurriculumFilter>, QueryRejection>,
) -> ApiResult<Vec<Record<CurriculumStandard>>> {
    let Query(filter) = query?;
    Ok(Json(state.tools.curriculum.search(&filter)?))
}

async fn check_alignment(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<AlignmentRequest>, JsonRejection>,
) -> ApiResult<AlignmentCheck> {
    let Json(request) = payload?;
    Ok(Json(state.tools.curriculum.check_alignment(&request)?))
}

async fn search_assignments(
    State(state): State<ApiState>,
    query: std::result::Result<Query<AssignmentFilter>, QueryRejection>,
) -> ApiResult<Vec<Record<Assignment>>> {
    let Query(filter) = query?;
    Ok(Json(state.tools.assignments.search(&filter)?))
}

async fn generate_rubric(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<RubricRequest>, JsonRejection>,
) -> ApiResult<Vec<RubricCriterion>> {
    let Json(request) = payload?;
    Ok(Json(state.tools.assignments.generate_rubric(&request)?))
}

async fn search_materials(
    State(state): State<ApiState>,
    query: std::result::Result<Query<StudyMaterialFilter>, QueryRejection>,
) -> ApiResult<Vec<Record<StudyMaterial>>> {
    let Query(filter) = query?;
    Ok(Json(state.tools.materials.search(&filter)?))
}

async fn differentiate_material(
    State(state): State<ApiState>,
    Path(material_id): Path<String>,
) -> ApiResult<DifferentiatedVersions> {
    Ok(Json(state.tools.materials.differentiate(&material_id)?))
}

async fn search_plans(
    State(state): State<ApiState>,
    query: std::result::Result<Query<RemediationFilter>, QueryRejection>,
) -> ApiResult<Vec<Record<RemediationPlan>>> {
    let Query(filter) = query?;
    Ok(Json(state.tools.remediation.search(&filter)?))
}

async fn add_progress_note(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<ProgressNoteRequest>, JsonRejection>,
) -> ApiResult<Record<RemediationPlan>> {
    let Json(request) = payload?;
    Ok(Json(state.tools.remediation.add_progress_note(&id, request)?))
}

async fn generate_suggestions(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<SuggestionRequest>, JsonRejection>,
) -> ApiResult<PlanDraft> {
    let Json(request) = payload?;
    Ok(Json(state.tools.remediation.suggest(&request)?))
}

async fn search_behavior(
    State(state): State<ApiState>,
    query: std::result::Result<Query<BehaviorFilter>, QueryRejection>,
) -> ApiResult<Vec<Record<BehaviorRecord>>> {
    let Query(filter) = query?;
    Ok(Json(state.tools.behavior.search(&filter)?))
}

async fn student_summary(
    State(state): State<ApiState>,
    Path(student_name): Path<String>,
) -> ApiResult<BehaviorSummary> {
    Ok(Json(state.tools.behavior.summary(&student_name)?))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::ApiError;
    use crate::error::ToolError;

    #[test]
    fn tool_errors_map_to_status_codes() {
        let validation = ApiError::from(ToolError::Validation(vec!["title is required".into()]));
        assert_eq!(validation.status, StatusCode::BAD_REQUEST);
        assert_eq!(validation.errors, vec!["title is required"]);

        let missing = ApiError::from(ToolError::not_found("Assignment", "a1"));
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.message, "Assignment not found: a1");

        let store = ApiError::from(ToolError::Store(anyhow::anyhow!("disk full")));
        assert_eq!(store.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(store.message, "server error");
    }
}
