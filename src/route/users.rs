use axum::{
	extract::State,
	http::StatusCode,
	routing::{get, post},
	Router,
};
use serde::Serialize;

use crate::{
	extract::{Json, RecordId},
	model::{SafeUser, UserId, UserProfile},
	service,
	service::user::CreateUserInput,
	store::Store,
	AppState, Error,
};

/// How many users a single populate call creates.
const POPULATE_COUNT: usize = 3;

pub fn routes() -> Router<AppState> {
	Router::new()
		.route("/users", get(list_users))
		.route("/user/:id", get(get_user))
		.route("/user", post(create_user))
		.route("/populate", get(populate_users))
}

/// Returns the list of user ids, ascending. Ids only; names and
/// hashes never appear here.
async fn list_users(State(store): State<Store>) -> Result<Json<Vec<UserId>>, Error> {
	Ok(Json(service::user::list_ids(&store).await?))
}

/// Returns a single user projected to `{id, name}`, wrapped in a
/// single-element array for frontend compatibility.
async fn get_user(
	State(store): State<Store>,
	RecordId(id): RecordId,
) -> Result<Json<[UserProfile; 1]>, Error> {
	let user = service::user::get(&store, id)
		.await?
		.ok_or(Error::UserNotFound)?;

	Ok(Json([user]))
}

/// Creates a user from `{name, password}`. The response never carries
/// the password in any form.
async fn create_user(
	State(state): State<AppState>,
	Json(input): Json<CreateUserInput>,
) -> Result<(StatusCode, Json<SafeUser>), Error> {
	let user = service::user::create(&state.store, &state.hasher, input).await?;

	Ok((StatusCode::CREATED, Json(user)))
}

#[derive(Debug, Serialize)]
pub struct PopulateResponse {
	pub message: String,
	pub users: Vec<SafeUser>,
}

/// Seeds the database with generated users from the identity service.
async fn populate_users(State(state): State<AppState>) -> Result<Json<PopulateResponse>, Error> {
	let users = service::user::populate(&state, POPULATE_COUNT).await?;

	Ok(Json(PopulateResponse {
		message: format!("{} users inserted", users.len()),
		users,
	}))
}
