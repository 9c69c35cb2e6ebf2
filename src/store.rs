use std::str::FromStr;

use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use validator::Validate;

use crate::model::{Comment, SafeUser, UserId, UserProfile};
use crate::Error;

/// Explicitly constructed storage handle, shared by cloning.
///
/// Every query goes through bound parameters; no request data is ever
/// interpolated into SQL. Field constraints are re-checked here so a
/// violating row can never be written, whichever path reaches the
/// store.
#[derive(Clone)]
pub struct Store {
	pool: SqlitePool,
}

/// A user ready to be written. The password must already be hashed by
/// the caller; the store never sees plaintext.
#[derive(Debug, Validate)]
pub struct NewUser {
	#[validate(length(min = 2, max = 255))]
	pub name: String,
	#[validate(length(min = 1))]
	pub password_hash: String,
}

#[derive(Debug, Validate)]
struct NewComment<'a> {
	#[validate(length(min = 1, max = 5000))]
	content: &'a str,
}

impl Store {
	/// Opens the connection pool. Called once at startup.
	pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
		let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

		// An in-memory database exists per connection, so the pool
		// must not open a second one.
		let max_connections = if url.contains(":memory:") { 1 } else { 10 };

		let pool = SqlitePoolOptions::new()
			.max_connections(max_connections)
			.connect_with(options)
			.await?;

		Ok(Self { pool })
	}

	/// Creates the tables if they do not exist yet.
	pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
		sqlx::query(
			r#"
			CREATE TABLE IF NOT EXISTS users (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				name TEXT NOT NULL,
				password TEXT NOT NULL,
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)
			"#,
		)
		.execute(&self.pool)
		.await?;

		sqlx::query(
			r#"
			CREATE TABLE IF NOT EXISTS comments (
				id INTEGER PRIMARY KEY AUTOINCREMENT,
				content TEXT NOT NULL,
				created_at TEXT NOT NULL,
				updated_at TEXT NOT NULL
			)
			"#,
		)
		.execute(&self.pool)
		.await?;

		Ok(())
	}

	/// Closes the pool on shutdown.
	pub async fn close(&self) {
		self.pool.close().await;
	}

	pub async fn insert_user(&self, user: NewUser) -> Result<SafeUser, Error> {
		user.validate()?;

		let now = Utc::now();
		let user = sqlx::query_as::<_, SafeUser>(
			r#"
			INSERT INTO users (name, password, created_at, updated_at)
			VALUES (?, ?, ?, ?)
			RETURNING id, name, created_at, updated_at
			"#,
		)
		.bind(&user.name)
		.bind(&user.password_hash)
		.bind(now)
		.bind(now)
		.fetch_one(&self.pool)
		.await?;

		Ok(user)
	}

	/// All user ids, ascending. Names and hashes stay out of the list.
	pub async fn user_ids(&self) -> Result<Vec<UserId>, Error> {
		let ids = sqlx::query_as::<_, UserId>("SELECT id FROM users ORDER BY id ASC")
			.fetch_all(&self.pool)
			.await?;

		Ok(ids)
	}

	pub async fn find_user(&self, id: i64) -> Result<Option<UserProfile>, Error> {
		let user = sqlx::query_as::<_, UserProfile>("SELECT id, name FROM users WHERE id = ?")
			.bind(id)
			.fetch_optional(&self.pool)
			.await?;

		Ok(user)
	}

	pub async fn insert_comment(&self, content: &str) -> Result<Comment, Error> {
		NewComment { content }.validate()?;

		let now = Utc::now();
		let comment = sqlx::query_as::<_, Comment>(
			r#"
			INSERT INTO comments (content, created_at, updated_at)
			VALUES (?, ?, ?)
			RETURNING id, content, created_at
			"#,
		)
		.bind(content)
		.bind(now)
		.bind(now)
		.fetch_one(&self.pool)
		.await?;

		Ok(comment)
	}

	pub async fn comments_newest_first(&self) -> Result<Vec<Comment>, Error> {
		let comments = sqlx::query_as::<_, Comment>(
			"SELECT id, content, created_at FROM comments ORDER BY id DESC",
		)
		.fetch_all(&self.pool)
		.await?;

		Ok(comments)
	}

	/// Returns the number of rows removed; zero is not an error.
	pub async fn delete_comment(&self, id: i64) -> Result<u64, Error> {
		let result = sqlx::query("DELETE FROM comments WHERE id = ?")
			.bind(id)
			.execute(&self.pool)
			.await?;

		Ok(result.rows_affected())
	}

	#[cfg(test)]
	pub(crate) fn pool(&self) -> &SqlitePool {
		&self.pool
	}
}

#[cfg(test)]
mod test {
	use super::{NewUser, Store};

	async fn store() -> Store {
		let store = Store::connect("sqlite::memory:").await.unwrap();
		store.init_schema().await.unwrap();
		store
	}

	fn user(name: &str) -> NewUser {
		NewUser {
			name: name.into(),
			password_hash: "$argon2id$fake-hash".into(),
		}
	}

	#[tokio::test]
	async fn rejects_out_of_bounds_names_before_writing() {
		let store = store().await;

		assert!(store.insert_user(user("a")).await.is_err());
		assert!(store.insert_user(user(&"x".repeat(256))).await.is_err());
		assert!(store.user_ids().await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn user_ids_are_ascending() {
		let store = store().await;

		for name in ["alice", "bob", "carol"] {
			store.insert_user(user(name)).await.unwrap();
		}

		let ids = store.user_ids().await.unwrap();
		let ids = ids.iter().map(|user| user.id).collect::<Vec<_>>();

		assert_eq!(ids, vec![1, 2, 3]);
	}

	#[tokio::test]
	async fn comments_come_back_newest_first() {
		let store = store().await;

		for content in ["first", "second", "third"] {
			store.insert_comment(content).await.unwrap();
		}

		let comments = store.comments_newest_first().await.unwrap();
		let contents = comments
			.iter()
			.map(|comment| comment.content.as_str())
			.collect::<Vec<_>>();

		assert_eq!(contents, vec!["third", "second", "first"]);
	}

	#[tokio::test]
	async fn quotes_in_content_are_stored_verbatim() {
		let store = store().await;

		let content = "Robert'); DROP TABLE comments;--";
		store.insert_comment(content).await.unwrap();

		let comments = store.comments_newest_first().await.unwrap();

		assert_eq!(comments.len(), 1);
		assert_eq!(comments[0].content, content);
	}

	#[tokio::test]
	async fn delete_reports_rows_removed() {
		let store = store().await;

		let comment = store.insert_comment("ephemeral").await.unwrap();

		assert_eq!(store.delete_comment(comment.id).await.unwrap(), 1);
		assert_eq!(store.delete_comment(comment.id).await.unwrap(), 0);
	}
}
