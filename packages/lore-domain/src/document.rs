use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Unknown document kind: {label}. Expected one of: pdf, docx, txt, markdown, epub.")]
	UnknownKind { label: String },
}

/// Closed set of file formats the ingest pipeline accepts.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
	Pdf,
	Docx,
	Txt,
	Markdown,
	Epub,
}
impl DocumentKind {
	pub fn as_str(self) -> &'static str {
		match self {
			DocumentKind::Pdf => "pdf",
			DocumentKind::Docx => "docx",
			DocumentKind::Txt => "txt",
			DocumentKind::Markdown => "markdown",
			DocumentKind::Epub => "epub",
		}
	}

	pub fn parse(raw: &str) -> Result<Self, Error> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"pdf" => Ok(DocumentKind::Pdf),
			"docx" => Ok(DocumentKind::Docx),
			"txt" | "text" => Ok(DocumentKind::Txt),
			"md" | "markdown" => Ok(DocumentKind::Markdown),
			"epub" => Ok(DocumentKind::Epub),
			other => Err(Error::UnknownKind { label: other.to_string() }),
		}
	}

	/// Kinds whose bytes are plain text and decode inline, without the
	/// extraction provider.
	pub fn is_plain_text(self) -> bool {
		matches!(self, DocumentKind::Txt | DocumentKind::Markdown)
	}
}

/// One uploaded unit of knowledge. Immutable after creation apart from
/// `metadata`; deleting it cascades to its chunks.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Document {
	pub doc_id: Uuid,
	pub user_id: String,
	pub title: String,
	pub kind: DocumentKind,
	pub content_bytes: i64,
	pub source_url: Option<String>,
	pub metadata: serde_json::Value,
	pub content_hash: String,
	pub created_at: OffsetDateTime,
}
