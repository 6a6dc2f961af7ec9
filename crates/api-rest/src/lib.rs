//! # API REST
//!
//! REST API implementation for the intake backend.
//!
//! Handles:
//! - HTTP endpoints with axum (bot CRUD, call logs, voice-agent webhooks, health)
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (status codes, JSON bodies, CORS, request tracing)
//!
//! All data operations are delegated to `intake-core`.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    AckRes, BotRecord, CallLogEntry, ErrorRes, FunctionCallTrace, GetPatientRes, HealthRes,
    HealthService, OpaqueEntry, Patient, PostCallReceipt, PostCallRes, PrecallRes, TraceKind,
};
use intake_core::{
    BotService, CallLogService, CoreConfig, IntakeError, PatientDirectory, RecordStore,
    SampleDirectory, WebhookService, BOT_NOT_FOUND_MESSAGE,
};

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    bots: BotService,
    call_logs: CallLogService,
    webhooks: WebhookService,
}

impl AppState {
    /// Build the state from startup configuration: a file-backed store and the sample
    /// patient directory.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self::with_store(
            Arc::new(RecordStore::open(cfg.db_path())),
            Arc::new(SampleDirectory::new()),
            cfg.fallback_medical_id().map(String::from),
        )
    }

    /// Build the state over an existing store and patient directory.
    pub fn with_store(
        store: Arc<RecordStore>,
        directory: Arc<dyn PatientDirectory>,
        fallback_medical_id: Option<String>,
    ) -> Self {
        let call_logs = CallLogService::new(store.clone());
        Self {
            bots: BotService::new(store),
            webhooks: WebhookService::new(directory, call_logs.clone(), fallback_medical_id),
            call_logs,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_bots,
        create_bot,
        update_bot,
        delete_bot,
        precall,
        get_patient,
        postcall,
        list_call_logs,
    ),
    components(schemas(
        HealthRes,
        AckRes,
        ErrorRes,
        BotRecord,
        Patient,
        PrecallRes,
        GetPatientRes,
        PostCallRes,
        CallLogEntry,
        FunctionCallTrace,
        PostCallReceipt,
        OpaqueEntry,
        TraceKind,
    ))
)]
pub struct ApiDoc;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/bots", get(list_bots).post(create_bot))
        .route("/api/bots/:uid", put(update_bot).delete(delete_bot))
        .route("/webhooks/precall", post(precall))
        .route("/functions/getPatient", post(get_patient))
        .route("/webhooks/postcall", post(postcall))
        .route("/api/call-logs", get(list_call_logs))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// ERRORS
// ============================================================================

/// Failure of a handler, mapped to a response.
///
/// A missing bot is the only failure with a structured body; everything else is an I/O fault
/// and gets the plain 500.
#[derive(Debug)]
pub struct ApiError(IntakeError);

impl From<IntakeError> for ApiError {
    fn from(e: IntakeError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            IntakeError::BotNotFound(_) => (
                StatusCode::NOT_FOUND,
                Json(ErrorRes {
                    error: BOT_NOT_FOUND_MESSAGE.into(),
                }),
            )
                .into_response(),
            e => {
                tracing::error!("Store error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

/// Request bodies are schemaless; anything that is not a JSON object counts as no fields.
fn body_fields(body: Option<Json<Value>>) -> Map<String, Value> {
    match body {
        Some(Json(Value::Object(fields))) => fields,
        _ => Map::new(),
    }
}

/// Query strings are read as a plain map so a repeated key never rejects the request; the last
/// value wins.
type QueryParams = Query<HashMap<String, String>>;

// ============================================================================
// HANDLERS
// ============================================================================

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/bots",
    responses(
        (status = 200, description = "All bot records in creation order", body = [BotRecord])
    )
)]
#[axum::debug_handler]
async fn list_bots(State(state): State<AppState>) -> Json<Vec<BotRecord>> {
    Json(state.bots.list())
}

#[utoipa::path(
    post,
    path = "/api/bots",
    request_body = BotRecord,
    responses(
        (status = 201, description = "Bot created", body = BotRecord),
        (status = 500, description = "Internal server error")
    )
)]
/// Create a bot record
///
/// Any fields are accepted. `uid` is generated when absent and `createdAt` is always set
/// by the server.
///
/// # Errors
/// Returns `500 Internal Server Error` if the store cannot be written.
#[axum::debug_handler]
async fn create_bot(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<(StatusCode, Json<BotRecord>), ApiError> {
    let bot = state.bots.create(body_fields(body))?;
    Ok((StatusCode::CREATED, Json(bot)))
}

#[utoipa::path(
    put,
    path = "/api/bots/{uid}",
    params(("uid" = String, Path, description = "Bot uid")),
    request_body = BotRecord,
    responses(
        (status = 200, description = "Bot updated", body = BotRecord),
        (status = 404, description = "No bot with this uid", body = ErrorRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Shallow-merge fields into an existing bot
///
/// `uid` and `createdAt` in the body are ignored.
///
/// # Errors
/// Returns `404 Not Found` if no bot has this uid, or `500 Internal Server Error` if the
/// store cannot be written.
#[axum::debug_handler]
async fn update_bot(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    body: Option<Json<Value>>,
) -> Result<Json<BotRecord>, ApiError> {
    let bot = state.bots.update(&uid, body_fields(body))?;
    Ok(Json(bot))
}

#[utoipa::path(
    delete,
    path = "/api/bots/{uid}",
    params(("uid" = String, Path, description = "Bot uid")),
    responses(
        (status = 200, description = "Bot deleted, or was already absent", body = AckRes),
        (status = 500, description = "Internal server error")
    )
)]
#[axum::debug_handler]
async fn delete_bot(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<AckRes>, ApiError> {
    state.bots.delete(&uid)?;
    Ok(Json(AckRes::ok()))
}

#[utoipa::path(
    post,
    path = "/webhooks/precall",
    params(("patientId" = Option<String>, Query, description = "Caller medical id")),
    request_body = OpaqueEntry,
    responses(
        (status = 200, description = "Caller context for the agent", body = PrecallRes)
    )
)]
/// Pre-call webhook
///
/// Called by the voice-agent platform before a call starts. The caller comes from
/// `?patientId=` or the body's `callerId`. Unknown callers get a placeholder record.
#[axum::debug_handler]
async fn precall(
    State(state): State<AppState>,
    Query(query): QueryParams,
    body: Option<Json<Value>>,
) -> Json<PrecallRes> {
    let body = body.map(|Json(v)| v);
    Json(state.webhooks.precall(
        query.get("patientId").map(String::as_str),
        body.as_ref(),
    ))
}

#[utoipa::path(
    post,
    path = "/functions/getPatient",
    params(("medicalId" = Option<String>, Query, description = "Medical id, if not in the body")),
    request_body = OpaqueEntry,
    responses(
        (status = 200, description = "`ok: true` with the patient, or `ok: false` when unknown", body = GetPatientRes),
        (status = 500, description = "Internal server error")
    )
)]
/// In-call function endpoint
///
/// Target of the agent's `getPatient` custom function. Successful lookups are traced in the
/// call log.
///
/// # Errors
/// Returns `500 Internal Server Error` if the trace cannot be written.
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    Query(query): QueryParams,
    body: Option<Json<Value>>,
) -> Result<Json<GetPatientRes>, ApiError> {
    let body = body.map(|Json(v)| v);
    let res = state
        .webhooks
        .get_patient(body.as_ref(), query.get("medicalId").map(String::as_str))?;
    Ok(Json(res))
}

#[utoipa::path(
    post,
    path = "/webhooks/postcall",
    request_body = OpaqueEntry,
    responses(
        (status = 200, description = "Payload stored", body = PostCallRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Post-call webhook
///
/// Stores the call result exactly as sent (transcript, metadata, function traces).
///
/// # Errors
/// Returns `500 Internal Server Error` if the receipt cannot be written.
#[axum::debug_handler]
async fn postcall(
    State(state): State<AppState>,
    body: Option<Json<Value>>,
) -> Result<Json<PostCallRes>, ApiError> {
    let res = state.webhooks.postcall(body.map(|Json(v)| v))?;
    Ok(Json(res))
}

#[utoipa::path(
    get,
    path = "/api/call-logs",
    responses(
        (status = 200, description = "Call log entries, oldest first", body = [CallLogEntry])
    )
)]
#[axum::debug_handler]
async fn list_call_logs(State(state): State<AppState>) -> Json<Vec<CallLogEntry>> {
    Json(state.call_logs.list())
}
