//! Mapping of core errors onto HTTP responses.

use crate::models::{ErrorRes, ViolationRes};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use patient_core::{PatientError, ValidationError, ViolationKind};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorRes,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorRes {
                detail: detail.into(),
                errors: Vec::new(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn validation(err: &ValidationError) -> Self {
        // Bad sort parameters are 400, record validation failures 422.
        let status = if err.has_kind(ViolationKind::InvalidField)
            || err.has_kind(ViolationKind::InvalidDirection)
        {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::UNPROCESSABLE_ENTITY
        };
        Self {
            status,
            body: ErrorRes {
                detail: err.to_string(),
                errors: err.violations.iter().map(ViolationRes::from).collect(),
            },
        }
    }
}

impl From<PatientError> for ApiError {
    fn from(err: PatientError) -> Self {
        match err {
            PatientError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, "patient not found"),
            PatientError::Duplicate(_) => {
                Self::new(StatusCode::BAD_REQUEST, "patient id already exists")
            }
            PatientError::InvalidInput(msg) => Self::new(StatusCode::BAD_REQUEST, msg),
            PatientError::Validation(e) => Self::validation(&e),
            PatientError::Storage(e) => {
                tracing::error!("Patient storage error: {:?}", e);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal storage error")
            }
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::validation(&err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match &rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => rejection.status(),
        };
        Self::new(status, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(PatientError::NotFound("P404".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(PatientError::Duplicate("P001".into())).status(),
            StatusCode::BAD_REQUEST
        );

        let bad_sort = ValidationError::single("sort_by", ViolationKind::InvalidField, "nope");
        assert_eq!(
            ApiError::from(PatientError::Validation(bad_sort)).status(),
            StatusCode::BAD_REQUEST
        );

        let bad_age = ValidationError::single("age", ViolationKind::OutOfRange, "too old");
        let err = ApiError::from(PatientError::Validation(bad_age));
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.body.errors.len(), 1);
        assert_eq!(err.body.errors[0].kind, "out_of_range");
    }
}
