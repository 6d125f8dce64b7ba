use serde_json::Value;
use uuid::Uuid;

use crate::{BoxFuture, Error, Result};
use lore_domain::{Document, DocumentKind};
use lore_storage::{
	db::Db,
	docs,
	models::{ChunkRow, DocumentRow, UserChunkRow},
};

/// One persisted passage as the search pipeline sees it: content, vector,
/// and source metadata, already joined with the owning document's title.
#[derive(Clone, Debug)]
pub struct StoredChunk {
	pub chunk_id: Uuid,
	pub doc_id: Uuid,
	pub doc_title: String,
	pub chunk_index: i32,
	pub start_offset: i32,
	pub end_offset: i32,
	pub token_estimate: i32,
	pub text: String,
	pub embedding: Vec<f32>,
}

/// A chunk prepared by the ingest pipeline, not yet persisted.
#[derive(Clone, Debug)]
pub struct NewChunk {
	pub chunk_id: Uuid,
	pub chunk_index: i32,
	pub start_offset: i32,
	pub end_offset: i32,
	pub token_estimate: i32,
	pub text: String,
	pub content_hash: String,
	pub embedding: Vec<f32>,
}

/// Store contract consumed by the engine. Every operation is scoped to one
/// user; implementations must never return another user's rows.
pub trait ChunkStore
where
	Self: Send + Sync,
{
	fn get_user_chunks<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Vec<StoredChunk>>>;

	fn save_chunks<'a>(
		&'a self,
		doc: &'a Document,
		chunks: &'a [NewChunk],
	) -> BoxFuture<'a, Result<()>>;

	fn get_document<'a>(
		&'a self,
		user_id: &'a str,
		doc_id: Uuid,
	) -> BoxFuture<'a, Result<Option<Document>>>;

	fn list_documents<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Vec<Document>>>;

	fn delete_document<'a>(&'a self, user_id: &'a str, doc_id: Uuid) -> BoxFuture<'a, Result<u64>>;

	fn update_document_metadata<'a>(
		&'a self,
		user_id: &'a str,
		doc_id: Uuid,
		metadata: &'a Value,
	) -> BoxFuture<'a, Result<u64>>;
}

/// Production store backed by Postgres.
pub struct PgChunkStore {
	pub db: Db,
}
impl PgChunkStore {
	pub fn new(db: Db) -> Self {
		Self { db }
	}
}
impl ChunkStore for PgChunkStore {
	fn get_user_chunks<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Vec<StoredChunk>>> {
		Box::pin(async move {
			let rows = docs::list_user_chunks(&self.db.pool, user_id).await?;

			Ok(rows.into_iter().map(stored_chunk_from_row).collect())
		})
	}

	fn save_chunks<'a>(
		&'a self,
		doc: &'a Document,
		chunks: &'a [NewChunk],
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let mut tx = self.db.pool.begin().await?;

			docs::insert_document(&mut *tx, &document_row(doc)).await?;

			for chunk in chunks {
				docs::insert_chunk(&mut *tx, &chunk_row(doc, chunk)).await?;
			}

			tx.commit().await?;

			Ok(())
		})
	}

	fn get_document<'a>(
		&'a self,
		user_id: &'a str,
		doc_id: Uuid,
	) -> BoxFuture<'a, Result<Option<Document>>> {
		Box::pin(async move {
			let row = docs::get_document(&self.db.pool, user_id, doc_id).await?;

			row.map(document_from_row).transpose()
		})
	}

	fn list_documents<'a>(&'a self, user_id: &'a str) -> BoxFuture<'a, Result<Vec<Document>>> {
		Box::pin(async move {
			let rows = docs::list_documents(&self.db.pool, user_id).await?;

			rows.into_iter().map(document_from_row).collect()
		})
	}

	fn delete_document<'a>(&'a self, user_id: &'a str, doc_id: Uuid) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move { Ok(docs::delete_document(&self.db.pool, user_id, doc_id).await?) })
	}

	fn update_document_metadata<'a>(
		&'a self,
		user_id: &'a str,
		doc_id: Uuid,
		metadata: &'a Value,
	) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			Ok(docs::update_document_metadata(&self.db.pool, user_id, doc_id, metadata).await?)
		})
	}
}

fn stored_chunk_from_row(row: UserChunkRow) -> StoredChunk {
	StoredChunk {
		chunk_id: row.chunk_id,
		doc_id: row.doc_id,
		doc_title: row.doc_title,
		chunk_index: row.chunk_index,
		start_offset: row.start_offset,
		end_offset: row.end_offset,
		token_estimate: row.token_estimate,
		text: row.chunk_text,
		embedding: row.embedding,
	}
}

fn document_from_row(row: DocumentRow) -> Result<Document> {
	let kind = DocumentKind::parse(row.kind.as_str()).map_err(|err| Error::Storage {
		message: format!("Persisted document {} has an invalid kind: {err}", row.doc_id),
	})?;

	Ok(Document {
		doc_id: row.doc_id,
		user_id: row.user_id,
		title: row.title,
		kind,
		content_bytes: row.content_bytes,
		source_url: row.source_url,
		metadata: row.metadata,
		content_hash: row.content_hash,
		created_at: row.created_at,
	})
}

fn document_row(doc: &Document) -> DocumentRow {
	DocumentRow {
		doc_id: doc.doc_id,
		user_id: doc.user_id.clone(),
		title: doc.title.clone(),
		kind: doc.kind.as_str().to_string(),
		content_bytes: doc.content_bytes,
		source_url: doc.source_url.clone(),
		metadata: doc.metadata.clone(),
		content_hash: doc.content_hash.clone(),
		created_at: doc.created_at,
	}
}

fn chunk_row(doc: &Document, chunk: &NewChunk) -> ChunkRow {
	ChunkRow {
		chunk_id: chunk.chunk_id,
		doc_id: doc.doc_id,
		chunk_index: chunk.chunk_index,
		start_offset: chunk.start_offset,
		end_offset: chunk.end_offset,
		token_estimate: chunk.token_estimate,
		chunk_text: chunk.text.clone(),
		chunk_hash: chunk.content_hash.clone(),
		embedding: chunk.embedding.clone(),
		created_at: doc.created_at,
	}
}
