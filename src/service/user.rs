use argon2::{
	password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
	Argon2,
};
use serde::Deserialize;
use validator::Validate;

use crate::model::{SafeUser, UserId, UserProfile};
use crate::store::{NewUser, Store};
use crate::{AppState, Error};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserInput {
	#[validate(length(min = 2, max = 255))]
	pub name: String,
	#[validate(length(min = 4, max = 255))]
	pub password: String,
}

/// Hashes a password with a fresh random salt, producing a PHC string.
///
/// This is the only place a plaintext password exists; it is dropped
/// as soon as the hash is computed, before anything touches the store.
pub fn hash_password(hasher: &Argon2, password: &str) -> Result<String, Error> {
	let salt = SaltString::generate(&mut OsRng);
	let hash = hasher.hash_password(password.as_bytes(), &salt)?;

	Ok(hash.to_string())
}

/// All user ids, ascending.
pub async fn list_ids(store: &Store) -> Result<Vec<UserId>, Error> {
	store.user_ids().await
}

/// Looks up one user by id, projected to `{id, name}`.
pub async fn get(store: &Store, id: i64) -> Result<Option<UserProfile>, Error> {
	store.find_user(id).await
}

/// Validates, hashes and persists a new user. The returned projection
/// never carries the hash.
pub async fn create(
	store: &Store,
	hasher: &Argon2<'_>,
	input: CreateUserInput,
) -> Result<SafeUser, Error> {
	input.validate()?;

	let password_hash = hash_password(hasher, &input.password)?;

	store
		.insert_user(NewUser {
			name: input.name,
			password_hash,
		})
		.await
}

/// Creates `count` users from identities fetched concurrently from the
/// external identity service.
///
/// The whole batch of upstream calls must succeed before any row is
/// written; a single failure fails the operation with nothing from
/// this batch persisted. A generated identity that cannot be
/// persisted is a populate failure, not a caller mistake, so it is
/// wrapped rather than surfaced as invalid input.
pub async fn populate(state: &AppState, count: usize) -> Result<Vec<SafeUser>, Error> {
	let identities =
		futures::future::try_join_all((0..count).map(|_| state.identity.fetch())).await?;

	let mut created = Vec::with_capacity(identities.len());

	for identity in identities {
		created.push(
			create(
				&state.store,
				&state.hasher,
				CreateUserInput {
					name: identity.name,
					password: identity.password,
				},
			)
			.await
			.map_err(|error| Error::Populate(Box::new(error)))?,
		);
	}

	Ok(created)
}
