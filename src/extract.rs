use axum::{
	body::Body,
	extract::{FromRequest, FromRequestParts, Path, Request},
	http::{header, request, Response},
	response::IntoResponse,
};
use serde::de;

use crate::error::Error;

/// Extractor that deserializes a JSON body and validates it.
pub struct Json<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
	T: de::DeserializeOwned + validator::Validate,
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let result = axum::extract::Json::<T>::from_request(req, state).await?.0;

		result.validate().map_err(Error::Validation)?;
		Ok(Self(result))
	}
}

impl<T> IntoResponse for Json<T>
where
	T: serde::Serialize,
{
	fn into_response(self) -> Response<Body> {
		axum::extract::Json(self.0).into_response()
	}
}

/// Extractor for a record id in the path.
///
/// The raw segment is trimmed, then must parse as a positive integer;
/// anything else is rejected as invalid input (400), never 404.
pub struct RecordId(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for RecordId
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let Path(raw) = Path::<String>::from_request_parts(parts, state)
			.await
			.map_err(|_| Error::InvalidId)?;

		let id = raw.trim().parse::<i64>().map_err(|_| Error::InvalidId)?;

		if id < 1 {
			return Err(Error::InvalidId);
		}

		Ok(Self(id))
	}
}

#[derive(serde::Deserialize)]
struct ContentInput {
	content: String,
}

/// Extractor for the comment body, which the frontend sends either as
/// JSON `{"content": ...}` or as a raw text body.
pub struct CommentBody(pub String);

#[axum::async_trait]
impl<S> FromRequest<S> for CommentBody
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let is_json = req
			.headers()
			.get(header::CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
			.is_some_and(|value| value.starts_with("application/json"));

		let content = if is_json {
			axum::extract::Json::<ContentInput>::from_request(req, state)
				.await?
				.0
				.content
		} else {
			String::from_request(req, state)
				.await
				.map_err(|rejection| match rejection.status() {
					axum::http::StatusCode::PAYLOAD_TOO_LARGE => Error::BodyTooLarge,
					_ => Error::InvalidBody,
				})?
		};

		Ok(Self(content))
	}
}
