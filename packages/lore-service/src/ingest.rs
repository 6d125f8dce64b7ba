use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{Error, LoreService, Result, store::NewChunk};
use lore_chunking::{ChunkingConfig, Tokenizer};
use lore_domain::{Document, DocumentKind};

#[derive(Clone, Debug, Deserialize)]
pub struct IngestRequest {
	pub user_id: String,
	pub title: String,
	pub kind: String,
	pub data: Vec<u8>,
	pub source_url: Option<String>,
	pub metadata: Option<Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct IngestResponse {
	pub doc_id: Uuid,
	pub chunk_count: u32,
	pub content_bytes: u64,
	pub content_hash: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DocumentGetRequest {
	pub user_id: String,
	pub doc_id: Uuid,
}

#[derive(Clone, Debug, Serialize)]
pub struct DocumentResponse {
	pub document: Document,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DocumentListRequest {
	pub user_id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct DocumentListResponse {
	pub documents: Vec<Document>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DocumentDeleteRequest {
	pub user_id: String,
	pub doc_id: Uuid,
}

#[derive(Clone, Debug, Serialize)]
pub struct DocumentDeleteResponse {
	pub doc_id: Uuid,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DocumentMetadataRequest {
	pub user_id: String,
	pub doc_id: Uuid,
	pub metadata: Value,
}

#[derive(Clone, Debug, Serialize)]
pub struct DocumentMetadataResponse {
	pub doc_id: Uuid,
}

impl LoreService {
	/// Turns one uploaded document into persisted, embedded chunks: extract
	/// text, normalize it, chunk it, embed every chunk, and save the whole
	/// batch in one transaction. Nothing is persisted when any step fails.
	pub async fn ingest(&self, req: IngestRequest) -> Result<IngestResponse> {
		let user_id = req.user_id.trim();
		let title = req.title.trim();

		if user_id.is_empty() {
			return Err(Error::InvalidRequest { message: "user_id is required.".to_string() });
		}
		if title.is_empty() {
			return Err(Error::InvalidRequest { message: "title must be non-empty.".to_string() });
		}
		if req.data.is_empty() {
			return Err(Error::InvalidRequest {
				message: "document data must be non-empty.".to_string(),
			});
		}
		if req.data.len() > self.cfg.ingest.max_document_bytes {
			return Err(Error::InvalidRequest {
				message: "document exceeds ingest.max_document_bytes.".to_string(),
			});
		}

		let kind = DocumentKind::parse(req.kind.as_str())?;
		let raw_text = if kind.is_plain_text() {
			String::from_utf8_lossy(&req.data).into_owned()
		} else {
			self.providers
				.extraction
				.extract(&self.cfg.providers.extraction, &req.data, kind)
				.await?
		};
		let text = normalize_text(&raw_text);

		if text.is_empty() {
			return Err(Error::InvalidRequest {
				message: "document contains no extractable text.".to_string(),
			});
		}

		let tokenizer = self.load_tokenizer();
		let chunking = ChunkingConfig {
			max_tokens: self.cfg.chunking.max_tokens,
			overlap_tokens: self.cfg.chunking.overlap_tokens,
		};
		let chunks = lore_chunking::split_text(&text, &chunking, tokenizer.as_ref())?;
		let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
		let mut embeddings = Vec::with_capacity(texts.len());

		for batch in texts.chunks(self.cfg.providers.embedding.batch_size as usize) {
			embeddings.extend(self.embed_batch(batch).await?);
		}

		let now = OffsetDateTime::now_utc();
		let content_hash = blake3::hash(text.as_bytes()).to_hex().to_string();
		let doc = Document {
			doc_id: Uuid::new_v4(),
			user_id: user_id.to_string(),
			title: title.to_string(),
			kind,
			content_bytes: req.data.len() as i64,
			source_url: req.source_url.clone(),
			metadata: req.metadata.clone().unwrap_or(Value::Object(Default::default())),
			content_hash: content_hash.clone(),
			created_at: now,
		};
		let new_chunks: Vec<NewChunk> = chunks
			.iter()
			.zip(embeddings)
			.map(|(chunk, embedding)| NewChunk {
				chunk_id: Uuid::new_v4(),
				chunk_index: chunk.chunk_index,
				start_offset: chunk.start_offset as i32,
				end_offset: chunk.end_offset as i32,
				token_estimate: chunk.token_estimate as i32,
				text: chunk.text.clone(),
				content_hash: blake3::hash(chunk.text.as_bytes()).to_hex().to_string(),
				embedding,
			})
			.collect();

		self.store.save_chunks(&doc, &new_chunks).await?;

		tracing::info!(
			doc_id = %doc.doc_id,
			chunk_count = new_chunks.len(),
			kind = kind.as_str(),
			"Document ingested."
		);

		Ok(IngestResponse {
			doc_id: doc.doc_id,
			chunk_count: new_chunks.len() as u32,
			content_bytes: req.data.len() as u64,
			content_hash,
		})
	}

	pub async fn get_document(&self, req: DocumentGetRequest) -> Result<DocumentResponse> {
		let user_id = require_user_id(req.user_id.as_str())?;
		let document = self
			.store
			.get_document(user_id, req.doc_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Document not found.".to_string() })?;

		Ok(DocumentResponse { document })
	}

	pub async fn list_documents(&self, req: DocumentListRequest) -> Result<DocumentListResponse> {
		let user_id = require_user_id(req.user_id.as_str())?;
		let documents = self.store.list_documents(user_id).await?;

		Ok(DocumentListResponse { documents })
	}

	/// Deletes a document and, through the store's cascade, every chunk it
	/// owns. A foreign or unknown document is indistinguishable from missing.
	pub async fn delete_document(
		&self,
		req: DocumentDeleteRequest,
	) -> Result<DocumentDeleteResponse> {
		let user_id = require_user_id(req.user_id.as_str())?;
		let deleted = self.store.delete_document(user_id, req.doc_id).await?;

		if deleted == 0 {
			return Err(Error::NotFound { message: "Document not found.".to_string() });
		}

		tracing::info!(doc_id = %req.doc_id, "Document deleted with its chunks.");

		Ok(DocumentDeleteResponse { doc_id: req.doc_id })
	}

	pub async fn update_document_metadata(
		&self,
		req: DocumentMetadataRequest,
	) -> Result<DocumentMetadataResponse> {
		let user_id = require_user_id(req.user_id.as_str())?;

		if !req.metadata.is_object() {
			return Err(Error::InvalidRequest {
				message: "metadata must be a JSON object.".to_string(),
			});
		}

		let updated =
			self.store.update_document_metadata(user_id, req.doc_id, &req.metadata).await?;

		if updated == 0 {
			return Err(Error::NotFound { message: "Document not found.".to_string() });
		}

		Ok(DocumentMetadataResponse { doc_id: req.doc_id })
	}

	fn load_tokenizer(&self) -> Option<Tokenizer> {
		let repo = self.cfg.chunking.tokenizer_repo.as_deref()?;

		match lore_chunking::load_tokenizer(repo) {
			Ok(tokenizer) => Some(tokenizer),
			Err(err) => {
				tracing::warn!(error = %err, repo, "Tokenizer load failed; falling back to the token estimate.");

				None
			},
		}
	}
}

fn require_user_id(user_id: &str) -> Result<&str> {
	let trimmed = user_id.trim();

	if trimmed.is_empty() {
		return Err(Error::InvalidRequest { message: "user_id is required.".to_string() });
	}

	Ok(trimmed)
}

/// Unifies line endings, composes to NFC, collapses runs of blank lines, and
/// trims the edges.
fn normalize_text(raw: &str) -> String {
	let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
	let composed: String = unified.nfc().collect();
	let mut out = String::with_capacity(composed.len());
	let mut newline_run = 0_usize;

	for ch in composed.chars() {
		if ch == '\n' {
			newline_run += 1;

			if newline_run > 2 {
				continue;
			}
		} else {
			newline_run = 0;
		}

		out.push(ch);
	}

	out.trim().to_string()
}
