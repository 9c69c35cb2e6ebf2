use crate::model::CommentView;
use crate::store::Store;
use crate::Error;

/// All comments, newest first, with escaped content.
pub async fn list(store: &Store) -> Result<Vec<CommentView>, Error> {
	let comments = store.comments_newest_first().await?;

	Ok(comments.into_iter().map(CommentView::from).collect())
}

/// Trims and persists a comment, returning the escaped projection.
/// Content that is empty after trimming or over 5000 characters is
/// rejected before anything is written.
pub async fn create(store: &Store, content: &str) -> Result<CommentView, Error> {
	let comment = store.insert_comment(content.trim()).await?;

	Ok(CommentView::from(comment))
}

/// Deletes a comment, reporting whether a row was actually removed.
/// A missing id is not an error here; the handler decides what a
/// `false` means on the wire.
pub async fn delete(store: &Store, id: i64) -> Result<bool, Error> {
	Ok(store.delete_comment(id).await? > 0)
}

#[cfg(test)]
mod test {
	use super::{create, delete, list};
	use crate::store::Store;

	async fn store() -> Store {
		let store = Store::connect("sqlite::memory:").await.unwrap();
		store.init_schema().await.unwrap();
		store
	}

	#[tokio::test]
	async fn persists_exactly_the_trimmed_content() {
		let store = store().await;

		create(&store, "  bonjour  ").await.unwrap();

		let comments = store.comments_newest_first().await.unwrap();

		assert_eq!(comments[0].content, "bonjour");
	}

	#[tokio::test]
	async fn rejects_empty_and_whitespace_content() {
		let store = store().await;

		assert!(create(&store, "").await.is_err());
		assert!(create(&store, &" ".repeat(10)).await.is_err());
		assert!(list(&store).await.unwrap().is_empty());
	}

	#[tokio::test]
	async fn rejects_content_over_the_length_bound() {
		let store = store().await;

		assert!(create(&store, &"x".repeat(5001)).await.is_err());
		assert!(create(&store, &"x".repeat(5000)).await.is_ok());
	}

	#[tokio::test]
	async fn returns_escaped_content() {
		let store = store().await;

		let comment = create(&store, "<script>alert('x')</script>").await.unwrap();

		assert!(!comment.content.contains('<'));
		assert!(!comment.content.contains('>'));
		assert!(comment.content.contains("&lt;script&gt;"));
	}

	#[tokio::test]
	async fn list_is_newest_first_and_escaped() {
		let store = store().await;

		create(&store, "plain").await.unwrap();
		create(&store, "<b>bold</b>").await.unwrap();

		let comments = list(&store).await.unwrap();

		assert_eq!(comments.len(), 2);
		assert_eq!(comments[0].content, "&lt;b&gt;bold&lt;&#x2F;b&gt;");
		assert_eq!(comments[1].content, "plain");
		assert!(comments[0].id > comments[1].id);
	}

	#[tokio::test]
	async fn delete_reports_whether_a_row_was_removed() {
		let store = store().await;

		let comment = create(&store, "ephemeral").await.unwrap();

		assert!(delete(&store, comment.id).await.unwrap());
		assert!(!delete(&store, comment.id).await.unwrap());
	}
}
