const INIT_SQL: &str = "\
CREATE TABLE IF NOT EXISTS documents (
	doc_id UUID PRIMARY KEY,
	user_id TEXT NOT NULL,
	title TEXT NOT NULL,
	kind TEXT NOT NULL,
	content_bytes BIGINT NOT NULL,
	source_url TEXT,
	metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
	content_hash TEXT NOT NULL,
	created_at TIMESTAMPTZ NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_user ON documents (user_id);

CREATE TABLE IF NOT EXISTS doc_chunks (
	chunk_id UUID PRIMARY KEY,
	doc_id UUID NOT NULL REFERENCES documents (doc_id) ON DELETE CASCADE,
	chunk_index INTEGER NOT NULL,
	start_offset INTEGER NOT NULL,
	end_offset INTEGER NOT NULL,
	token_estimate INTEGER NOT NULL,
	chunk_text TEXT NOT NULL,
	chunk_hash TEXT NOT NULL,
	embedding REAL[] NOT NULL,
	created_at TIMESTAMPTZ NOT NULL,
	UNIQUE (doc_id, chunk_index)
);

CREATE INDEX IF NOT EXISTS idx_doc_chunks_doc ON doc_chunks (doc_id)";

pub fn render_schema() -> String {
	INIT_SQL.to_string()
}
