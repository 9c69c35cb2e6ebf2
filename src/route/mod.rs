use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use serde::Serialize;

use crate::AppState;

pub mod comments;
pub mod users;

/// All API routes. Mounted twice by the caller: under `/api` and at
/// the root for compatibility with the old frontend.
pub fn routes() -> Router<AppState> {
	Router::new().merge(users::routes()).merge(comments::routes())
}

#[derive(Debug, Serialize)]
pub struct Health {
	pub status: &'static str,
	pub timestamp: chrono::DateTime<chrono::Utc>,
	pub environment: &'static str,
}

/// Liveness probe.
pub async fn health() -> Json<Health> {
	Json(Health {
		status: "OK",
		timestamp: chrono::Utc::now(),
		environment: if cfg!(debug_assertions) {
			"development"
		} else {
			"production"
		},
	})
}

/// Terminal 404 for anything no route matched.
pub async fn fallback() -> impl IntoResponse {
	(
		StatusCode::NOT_FOUND,
		Json(crate::error::ErrorResponse {
			error: "Route not found".into(),
		}),
	)
}
