//! # API REST
//!
//! REST API for the patient records service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON bodies, status codes, CORS)
//!
//! All record semantics live in `patient-core`; handlers only translate between wire
//! types and [`PatientService`] calls.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod models;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::ApiError;
pub use models::*;
pub use patient_core::PatientService;

use patient_core::{ValidationError, ViolationKind};

#[derive(OpenApi)]
#[openapi(
    paths(
        root,
        about,
        health,
        view_patients,
        get_patient,
        sort_patients,
        create_patient,
        update_patient,
        delete_patient
    ),
    components(schemas(
        MessageRes,
        HealthRes,
        PatientRes,
        CreatePatientReq,
        UpdatePatientReq,
        ErrorRes,
        ViolationRes
    )),
    tags((name = "patients", description = "Patient records management"))
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub patient_service: PatientService,
}

impl AppState {
    pub fn new(patient_service: PatientService) -> Self {
        Self { patient_service }
    }
}

/// Build the application router with Swagger UI, tracing and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(root))
        .route("/about", get(about))
        .route("/health", get(health))
        .route("/view", get(view_patients))
        .route("/patient/:id", get(get_patient))
        .route("/sort", get(sort_patients))
        .route("/create", post(create_patient))
        .route("/edit/:id", put(update_patient))
        .route("/delete/:id", delete(delete_patient))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service banner", body = MessageRes))
)]
async fn root() -> Json<MessageRes> {
    Json(MessageRes::new("Patient management system api"))
}

#[utoipa::path(
    get,
    path = "/about",
    responses((status = 200, description = "Service description", body = MessageRes))
)]
async fn about() -> Json<MessageRes> {
    Json(MessageRes::new("a full functional api to manage patient records"))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is alive", body = HealthRes))
)]
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Patient records API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/view",
    tag = "patients",
    responses(
        (status = 200, description = "All patients keyed by id", body = HashMap<String, PatientRes>),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// List all patients
///
/// # Returns
/// * `Ok(Json<PatientMapRes>)` - Every record keyed by id, in storage order
/// * `Err(ApiError)` - Internal server error if the data file cannot be read
#[axum::debug_handler]
async fn view_patients(State(state): State<AppState>) -> Result<Json<PatientMapRes>, ApiError> {
    let records = state.patient_service.list_patients()?;
    Ok(Json(PatientMapRes::from(&records)))
}

#[utoipa::path(
    get,
    path = "/patient/{id}",
    tag = "patients",
    params(("id" = String, Path, description = "ID of the patient", example = "P001")),
    responses(
        (status = 200, description = "Patient record", body = PatientRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<PatientRes>, ApiError> {
    let record = state.patient_service.get_patient(&id)?;
    Ok(Json(PatientRes::from(&record)))
}

#[utoipa::path(
    get,
    path = "/sort",
    tag = "patients",
    params(SortParams),
    responses(
        (status = 200, description = "Patients sorted by the requested metric", body = Vec<PatientRes>),
        (status = 400, description = "Unsupported sort field or order", body = ErrorRes),
        (status = 422, description = "Missing sort field", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn sort_patients(
    State(state): State<AppState>,
    params: Result<Query<SortParams>, QueryRejection>,
) -> Result<Json<Vec<PatientRes>>, ApiError> {
    let Query(params) = params?;
    let sort_by = params.sort_by.ok_or_else(|| {
        ValidationError::single(
            "sort_by",
            ViolationKind::MissingRequired,
            "query parameter is required",
        )
    })?;
    let records = state
        .patient_service
        .sort_patients(&sort_by, params.order.as_deref())?;
    Ok(Json(records.iter().map(PatientRes::from).collect()))
}

#[utoipa::path(
    post,
    path = "/create",
    tag = "patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient created", body = MessageRes),
        (status = 400, description = "Patient id already exists", body = ErrorRes),
        (status = 422, description = "Invalid patient record", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Create a new patient record
///
/// Every field is required. All constraint violations are reported together; nothing
/// is stored unless the whole record is valid.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    payload: Result<Json<CreatePatientReq>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageRes>), ApiError> {
    let Json(req) = payload?;
    state.patient_service.create_patient(req.into())?;
    Ok((
        StatusCode::CREATED,
        Json(MessageRes::new("patient created successfully")),
    ))
}

#[utoipa::path(
    put,
    path = "/edit/{id}",
    tag = "patients",
    params(("id" = String, Path, description = "ID of the patient", example = "P001")),
    request_body = UpdatePatientReq,
    responses(
        (status = 200, description = "Patient updated", body = MessageRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 422, description = "Updated record is invalid", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
/// Apply a partial update
///
/// Omitted fields keep their current value; `bmi` and `verdict` are recomputed from the
/// merged height and weight.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    payload: Result<Json<UpdatePatientReq>, JsonRejection>,
) -> Result<Json<MessageRes>, ApiError> {
    let Json(req) = payload?;
    state.patient_service.update_patient(&id, &req.into())?;
    Ok(Json(MessageRes::new("patient updated")))
}

#[utoipa::path(
    delete,
    path = "/delete/{id}",
    tag = "patients",
    params(("id" = String, Path, description = "ID of the patient", example = "P001")),
    responses(
        (status = 200, description = "Patient deleted", body = MessageRes),
        (status = 404, description = "Patient not found", body = ErrorRes),
        (status = 500, description = "Internal server error", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn delete_patient(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<MessageRes>, ApiError> {
    state.patient_service.delete_patient(&id)?;
    Ok(Json(MessageRes::new("patient deleted")))
}
