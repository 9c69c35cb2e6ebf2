use axum::{
	extract::State,
	http::StatusCode,
	routing::{delete, get, post},
	Router,
};
use serde::Serialize;

use crate::{
	extract::{CommentBody, Json, RecordId},
	model::CommentView,
	service,
	store::Store,
	AppState, Error,
};

pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/comments", get(list_comments))
		.route("/comment", post(create_comment))
		.route("/comment/:id", delete(delete_comment))
}

/// Returns all comments, newest first, content escaped.
async fn list_comments(State(store): State<Store>) -> Result<Json<Vec<CommentView>>, Error> {
	Ok(Json(service::comment::list(&store).await?))
}

#[derive(Debug, Serialize)]
pub struct CreateCommentResponse {
	pub success: bool,
	pub comment: CommentView,
}

/// Creates a comment from either a JSON `{content}` body or raw text.
async fn create_comment(
	State(store): State<Store>,
	CommentBody(content): CommentBody,
) -> Result<(StatusCode, Json<CreateCommentResponse>), Error> {
	let comment = service::comment::create(&store, &content).await?;

	Ok((
		StatusCode::CREATED,
		Json(CreateCommentResponse {
			success: true,
			comment,
		}),
	))
}

#[derive(Debug, Serialize)]
pub struct DeleteCommentResponse {
	pub success: bool,
	pub message: String,
}

/// Deletes a comment by id. Deleting an id that no longer exists is a
/// 404, not a silent success.
async fn delete_comment(
	State(store): State<Store>,
	RecordId(id): RecordId,
) -> Result<Json<DeleteCommentResponse>, Error> {
	if service::comment::delete(&store, id).await? {
		Ok(Json(DeleteCommentResponse {
			success: true,
			message: "Comment deleted".into(),
		}))
	} else {
		Err(Error::CommentNotFound)
	}
}
