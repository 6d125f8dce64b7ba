use axum::{
	Json, Router,
	extract::State,
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use lore_service::{
	DocumentDeleteRequest, DocumentDeleteResponse, DocumentGetRequest, DocumentListRequest,
	DocumentListResponse, DocumentMetadataRequest, DocumentMetadataResponse, DocumentResponse,
	Error as ServiceError, IngestRequest, IngestResponse, SearchRequest, SearchResponse,
};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/documents/ingest", post(ingest))
		.route("/v1/documents/get", post(get_document))
		.route("/v1/documents/list", post(list_documents))
		.route("/v1/documents/delete", post(delete_document))
		.route("/v1/documents/metadata", post(update_metadata))
		.route("/v1/search", post(search))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn ingest(
	State(state): State<AppState>,
	Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
	let response = state.service.ingest(payload).await?;
	Ok(Json(response))
}

async fn get_document(
	State(state): State<AppState>,
	Json(payload): Json<DocumentGetRequest>,
) -> Result<Json<DocumentResponse>, ApiError> {
	let response = state.service.get_document(payload).await?;
	Ok(Json(response))
}

async fn list_documents(
	State(state): State<AppState>,
	Json(payload): Json<DocumentListRequest>,
) -> Result<Json<DocumentListResponse>, ApiError> {
	let response = state.service.list_documents(payload).await?;
	Ok(Json(response))
}

async fn delete_document(
	State(state): State<AppState>,
	Json(payload): Json<DocumentDeleteRequest>,
) -> Result<Json<DocumentDeleteResponse>, ApiError> {
	let response = state.service.delete_document(payload).await?;
	Ok(Json(response))
}

async fn update_metadata(
	State(state): State<AppState>,
	Json(payload): Json<DocumentMetadataRequest>,
) -> Result<Json<DocumentMetadataResponse>, ApiError> {
	let response = state.service.update_document_metadata(payload).await?;
	Ok(Json(response))
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let response = state.service.search(payload).await?;
	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } => Self {
				status: StatusCode::BAD_REQUEST,
				error_code: "invalid_request".to_string(),
				message,
			},
			ServiceError::NotFound { message } => Self {
				status: StatusCode::NOT_FOUND,
				error_code: "not_found".to_string(),
				message,
			},
			ServiceError::Provider { message } => {
				tracing::error!(%message, "Upstream provider failed.");

				Self {
					status: StatusCode::BAD_GATEWAY,
					error_code: "upstream_failed".to_string(),
					message: "Search failed. Please try again.".to_string(),
				}
			},
			ServiceError::Storage { message } => {
				tracing::error!(%message, "Storage operation failed.");

				Self {
					status: StatusCode::INTERNAL_SERVER_ERROR,
					error_code: "storage_failed".to_string(),
					message: "Search failed. Please try again.".to_string(),
				}
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
