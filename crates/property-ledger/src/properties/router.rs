use std::error::Error as _;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use super::domain::{NewProperty, Property, PropertyWithComparison, SearchPropertiesResult};
use super::payload::{parse_create_request, SearchParams};
use super::repository::{PropertyRepository, StorageError};
use super::service::{ErrorKind, PropertyService, PropertyServiceError};
use super::validation::{FieldViolation, ValidationError};
use crate::middleware::request_id;

/// Router exposing `POST /properties` and `GET /properties`.
pub fn property_router<R>(service: Arc<PropertyService<R>>) -> Router
where
    R: PropertyRepository + ?Sized + 'static,
{
    Router::new()
        .route(
            "/properties",
            post(create_handler::<R>).get(search_handler::<R>),
        )
        .with_state(service)
}

/// Wire shape of a search response.
#[derive(Debug, Serialize, ToSchema)]
pub struct PropertySearchResponse {
    pub properties: Vec<PropertyWithComparison>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

impl From<SearchPropertiesResult> for PropertySearchResponse {
    fn from(result: SearchPropertiesResult) -> Self {
        Self {
            pagination: Pagination {
                page: result.page,
                limit: result.limit,
                total: result.total,
                total_pages: result.total_pages,
            },
            properties: result.properties,
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    #[schema(example = "error")]
    pub status: String,
    pub message: String,
    pub request_id: String,
    /// RFC 3339 with millisecond precision.
    #[schema(format = DateTime)]
    pub timestamp: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldViolation>,
}

impl ErrorResponse {
    fn new(message: String, request_id: String, details: Vec<FieldViolation>) -> Self {
        Self {
            status: "error".to_string(),
            message,
            request_id,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            details,
        }
    }
}

/// Add a property sale.
#[utoipa::path(
    post,
    path = "/properties",
    tag = "properties",
    request_body = NewProperty,
    responses(
        (status = 201, description = "Property stored", body = Property),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 500, description = "Property store failure", body = ErrorResponse)
    )
)]
pub async fn create_handler<R>(
    State(service): State<Arc<PropertyService<R>>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Property>), ApiError>
where
    R: PropertyRepository + ?Sized + 'static,
{
    let request_id = request_id(&headers);
    let Json(body) = body.map_err(|rejection| ApiError::from_json_rejection(&request_id, rejection))?;
    let input = parse_create_request(&body).map_err(|err| ApiError::validation(&request_id, err))?;

    let stored = service
        .add_property(input)
        .await
        .map_err(|err| ApiError::from_service(&request_id, err))?;
    Ok((StatusCode::CREATED, Json(stored)))
}

/// Search property sales with suburb averages.
#[utoipa::path(
    get,
    path = "/properties",
    tag = "properties",
    params(SearchParams),
    responses(
        (status = 200, description = "One page of matching sales", body = PropertySearchResponse),
        (status = 400, description = "Invalid pagination parameters", body = ErrorResponse),
        (status = 500, description = "Property store failure", body = ErrorResponse)
    )
)]
pub async fn search_handler<R>(
    State(service): State<Arc<PropertyService<R>>>,
    headers: HeaderMap,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<PropertySearchResponse>, ApiError>
where
    R: PropertyRepository + ?Sized + 'static,
{
    let request_id = request_id(&headers);
    let Query(params) = params.map_err(|rejection| {
        ApiError::validation(
            &request_id,
            ValidationError::field("query", rejection.body_text()),
        )
    })?;
    let query = params
        .into_query()
        .map_err(|err| ApiError::validation(&request_id, err))?;

    let result = service
        .search_properties(query)
        .await
        .map_err(|err| ApiError::from_service(&request_id, err))?;
    Ok(Json(result.into()))
}

/// What went wrong while serving a request.
#[derive(Debug)]
pub enum ApiFailure {
    Validation(ValidationError),
    Storage(StorageError),
    Unknown(String),
}

/// Error rendered as `{status, message, requestId, timestamp, details?}`.
#[derive(Debug)]
pub struct ApiError {
    pub request_id: String,
    pub failure: ApiFailure,
}

impl ApiError {
    fn validation(request_id: &str, error: ValidationError) -> Self {
        Self {
            request_id: request_id.to_string(),
            failure: ApiFailure::Validation(error),
        }
    }

    fn from_service(request_id: &str, error: PropertyServiceError) -> Self {
        let failure = match error {
            PropertyServiceError::Validation(err) => ApiFailure::Validation(err),
            PropertyServiceError::Storage(err) => ApiFailure::Storage(err),
        };
        Self {
            request_id: request_id.to_string(),
            failure,
        }
    }

    fn from_json_rejection(request_id: &str, rejection: JsonRejection) -> Self {
        let failure = match &rejection {
            JsonRejection::JsonDataError(_)
            | JsonRejection::JsonSyntaxError(_)
            | JsonRejection::MissingJsonContentType(_) => {
                ApiFailure::Validation(ValidationError::field("body", rejection.body_text()))
            }
            _ => ApiFailure::Unknown(rejection.body_text()),
        };
        Self {
            request_id: request_id.to_string(),
            failure,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.failure {
            ApiFailure::Validation(_) => ErrorKind::Validation,
            ApiFailure::Storage(_) => ErrorKind::Storage,
            ApiFailure::Unknown(_) => ErrorKind::Unknown,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError {
            request_id,
            failure,
        } = self;

        let (status, message, details) = match failure {
            ApiFailure::Validation(err) => (StatusCode::BAD_REQUEST, err.message, err.details),
            ApiFailure::Storage(err) => {
                let cause = err.source().map(ToString::to_string);
                error!(%request_id, error = %err, ?cause, "property store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), Vec::new())
            }
            ApiFailure::Unknown(detail) => {
                error!(%request_id, %detail, "unexpected request failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Vec::new(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message, request_id, details))).into_response()
    }
}
