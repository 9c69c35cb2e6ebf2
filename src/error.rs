use axum::{
	body::Body,
	extract::rejection,
	http::{Response, StatusCode},
	response::IntoResponse,
	Json,
};
use serde::Serialize;

/// Error type for the application.
///
/// The Display trait is not sent to the client outside of development
/// builds, so it can show sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("id must be a positive integer")]
	InvalidId,
	#[error("request body must be valid utf-8 text")]
	InvalidBody,
	#[error("request body exceeds the size limit")]
	BodyTooLarge,
	#[error("user not found")]
	UserNotFound,
	#[error("comment not found")]
	CommentNotFound,
	#[error("identity service error: {0}")]
	Upstream(#[from] reqwest::Error),
	#[error("identity service returned an empty response")]
	UpstreamPayload,
	#[error("failed to persist generated users: {0}")]
	Populate(#[source] Box<Error>),
	#[error("password hashing error: {0}")]
	Hash(#[from] argon2::password_hash::Error),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
}

impl Error {
	fn status(&self) -> StatusCode {
		match self {
			// axum answers 422 for deserialization errors; the wire
			// contract wants 400 for anything malformed.
			Self::Json(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
				StatusCode::PAYLOAD_TOO_LARGE
			}
			Self::Validation(..) | Self::Json(..) | Self::InvalidId | Self::InvalidBody => {
				StatusCode::BAD_REQUEST
			}
			Self::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
			Self::UserNotFound | Self::CommentNotFound => StatusCode::NOT_FOUND,
			Self::Upstream(..)
			| Self::UpstreamPayload
			| Self::Populate(..)
			| Self::Hash(..)
			| Self::Database(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// The message sent to the client. Internal failures collapse to a
	/// generic message outside of development builds.
	fn message(&self) -> String {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors
						.iter()
						.map(move |error| format!("{field}: {error}"))
				})
				.collect::<Vec<_>>()
				.join(", "),
			Self::Json(error) => error.to_string(),
			Self::InvalidId
			| Self::InvalidBody
			| Self::BodyTooLarge
			| Self::UserNotFound
			| Self::CommentNotFound => self.to_string(),
			_ if cfg!(debug_assertions) => self.to_string(),
			_ => "an internal error occurred".into(),
		}
	}
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
	pub error: String,
}

impl IntoResponse for Error {
	fn into_response(self) -> Response<Body> {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!("unhandled error: {self}");
		}

		(
			status,
			Json(ErrorResponse {
				error: self.message(),
			}),
		)
			.into_response()
	}
}

/// Fallback for anything that panics below the middleware stack. Logs
/// the payload and hides it from the client.
pub fn handle_panic(panic: Box<dyn std::any::Any + Send + 'static>) -> Response<Body> {
	let detail = panic
		.downcast_ref::<&str>()
		.map(|s| (*s).to_string())
		.or_else(|| panic.downcast_ref::<String>().cloned())
		.unwrap_or_else(|| "unknown panic".to_string());

	tracing::error!("panic while handling request: {detail}");

	(
		StatusCode::INTERNAL_SERVER_ERROR,
		Json(ErrorResponse {
			error: "an internal error occurred".into(),
		}),
	)
		.into_response()
}
