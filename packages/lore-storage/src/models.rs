use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
	pub doc_id: Uuid,
	pub user_id: String,
	pub title: String,
	pub kind: String,
	pub content_bytes: i64,
	pub source_url: Option<String>,
	pub metadata: Value,
	pub content_hash: String,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ChunkRow {
	pub chunk_id: Uuid,
	pub doc_id: Uuid,
	pub chunk_index: i32,
	pub start_offset: i32,
	pub end_offset: i32,
	pub token_estimate: i32,
	pub chunk_text: String,
	pub chunk_hash: String,
	pub embedding: Vec<f32>,
	pub created_at: OffsetDateTime,
}

/// Join row returned by `list_user_chunks`: one chunk plus the owning
/// document's title, already scoped to a single user.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserChunkRow {
	pub chunk_id: Uuid,
	pub doc_id: Uuid,
	pub doc_title: String,
	pub chunk_index: i32,
	pub start_offset: i32,
	pub end_offset: i32,
	pub token_estimate: i32,
	pub chunk_text: String,
	pub embedding: Vec<f32>,
}
