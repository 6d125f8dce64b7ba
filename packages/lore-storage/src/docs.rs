use serde_json::Value;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{
	Result,
	models::{ChunkRow, DocumentRow, UserChunkRow},
};

pub async fn insert_document<'e, E>(executor: E, doc: &DocumentRow) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO documents (
\tdoc_id,
\tuser_id,
\ttitle,
\tkind,
\tcontent_bytes,
\tsource_url,
\tmetadata,
\tcontent_hash,
\tcreated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)",
	)
	.bind(doc.doc_id)
	.bind(doc.user_id.as_str())
	.bind(doc.title.as_str())
	.bind(doc.kind.as_str())
	.bind(doc.content_bytes)
	.bind(doc.source_url.as_deref())
	.bind(&doc.metadata)
	.bind(doc.content_hash.as_str())
	.bind(doc.created_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn insert_chunk<'e, E>(executor: E, chunk: &ChunkRow) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO doc_chunks (
\tchunk_id,
\tdoc_id,
\tchunk_index,
\tstart_offset,
\tend_offset,
\ttoken_estimate,
\tchunk_text,
\tchunk_hash,
\tembedding,
\tcreated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)",
	)
	.bind(chunk.chunk_id)
	.bind(chunk.doc_id)
	.bind(chunk.chunk_index)
	.bind(chunk.start_offset)
	.bind(chunk.end_offset)
	.bind(chunk.token_estimate)
	.bind(chunk.chunk_text.as_str())
	.bind(chunk.chunk_hash.as_str())
	.bind(chunk.embedding.as_slice())
	.bind(chunk.created_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn get_document<'e, E>(
	executor: E,
	user_id: &str,
	doc_id: Uuid,
) -> Result<Option<DocumentRow>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, DocumentRow>(
		"\
SELECT
\tdoc_id,
\tuser_id,
\ttitle,
\tkind,
\tcontent_bytes,
\tsource_url,
\tCOALESCE(metadata, '{}'::jsonb) AS metadata,
\tcontent_hash,
\tcreated_at
FROM documents
WHERE user_id = $1 AND doc_id = $2
LIMIT 1",
	)
	.bind(user_id)
	.bind(doc_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn list_documents<'e, E>(executor: E, user_id: &str) -> Result<Vec<DocumentRow>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, DocumentRow>(
		"\
SELECT
\tdoc_id,
\tuser_id,
\ttitle,
\tkind,
\tcontent_bytes,
\tsource_url,
\tCOALESCE(metadata, '{}'::jsonb) AS metadata,
\tcontent_hash,
\tcreated_at
FROM documents
WHERE user_id = $1
ORDER BY created_at DESC",
	)
	.bind(user_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Every persisted chunk belonging to one user, joined with its document
/// title. The user scoping lives in the query itself so callers cannot reach
/// another user's chunks.
pub async fn list_user_chunks<'e, E>(executor: E, user_id: &str) -> Result<Vec<UserChunkRow>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, UserChunkRow>(
		"\
SELECT
\tc.chunk_id,
\tc.doc_id,
\td.title AS doc_title,
\tc.chunk_index,
\tc.start_offset,
\tc.end_offset,
\tc.token_estimate,
\tc.chunk_text,
\tc.embedding
FROM doc_chunks c
JOIN documents d ON c.doc_id = d.doc_id
WHERE d.user_id = $1
ORDER BY c.doc_id, c.chunk_index ASC",
	)
	.bind(user_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Removes the document and, through the foreign key cascade, all of its
/// chunks. Returns the number of documents deleted (0 or 1).
pub async fn delete_document<'e, E>(executor: E, user_id: &str, doc_id: Uuid) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM documents WHERE user_id = $1 AND doc_id = $2")
		.bind(user_id)
		.bind(doc_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected())
}

pub async fn update_document_metadata<'e, E>(
	executor: E,
	user_id: &str,
	doc_id: Uuid,
	metadata: &Value,
) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result =
		sqlx::query("UPDATE documents SET metadata = $1 WHERE user_id = $2 AND doc_id = $3")
			.bind(metadata)
			.bind(user_id)
			.bind(doc_id)
			.execute(executor)
			.await?;

	Ok(result.rows_affected())
}

pub fn normalize_metadata(metadata: Option<Value>) -> Value {
	metadata.unwrap_or(Value::Object(Default::default()))
}
