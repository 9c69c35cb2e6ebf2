use serde::Serialize;
use sqlx::FromRow;

use crate::escape;

/// A user id on its own, the only thing the user listing exposes.
#[derive(Debug, Serialize, FromRow)]
pub struct UserId {
	pub id: i64,
}

/// The projection returned when looking up a single user.
///
/// Never carries the password hash, which stays behind the store.
#[derive(Debug, Serialize, FromRow)]
pub struct UserProfile {
	pub id: i64,
	pub name: String,
}

/// The projection returned after creating a user: everything except
/// the password hash.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SafeUser {
	pub id: i64,
	pub name: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A comment row as stored, with raw content.
#[derive(Debug, FromRow)]
pub struct Comment {
	pub id: i64,
	pub content: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A comment as shown to clients: content is HTML-escaped so it cannot
/// be interpreted as markup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
	pub id: i64,
	pub content: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Comment> for CommentView {
	fn from(comment: Comment) -> Self {
		Self {
			id: comment.id,
			content: escape::html(&comment.content),
			created_at: comment.created_at,
		}
	}
}
