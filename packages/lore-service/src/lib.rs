pub mod error;
pub mod ingest;
pub mod search;
pub mod store;

use std::{future::Future, pin::Pin, sync::Arc};

use lore_config::{Config, EmbeddingProviderConfig, ExtractionProviderConfig};
use lore_domain::DocumentKind;
use lore_providers::{embedding, extraction};
use lore_storage::db::Db;

pub use error::{Error, Result};
pub use ingest::{
	DocumentDeleteRequest, DocumentDeleteResponse, DocumentGetRequest, DocumentListRequest,
	DocumentListResponse, DocumentMetadataRequest, DocumentMetadataResponse, DocumentResponse,
	IngestRequest, IngestResponse,
};
pub use search::{
	SearchItem, SearchRequest, SearchResponse, SearchTrajectory, SearchTrajectoryStage,
};
pub use store::{ChunkStore, NewChunk, PgChunkStore, StoredChunk};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait ExtractionProvider
where
	Self: Send + Sync,
{
	fn extract<'a>(
		&'a self,
		cfg: &'a ExtractionProviderConfig,
		data: &'a [u8],
		kind: DocumentKind,
	) -> BoxFuture<'a, color_eyre::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub extraction: Arc<dyn ExtractionProvider>,
}

pub struct LoreService {
	pub cfg: Config,
	pub store: Arc<dyn ChunkStore>,
	pub providers: Providers,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl ExtractionProvider for DefaultProviders {
	fn extract<'a>(
		&'a self,
		cfg: &'a ExtractionProviderConfig,
		data: &'a [u8],
		kind: DocumentKind,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(extraction::extract(cfg, data, kind))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, extraction: Arc<dyn ExtractionProvider>) -> Self {
		Self { embedding, extraction }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);
		Self { embedding: provider.clone(), extraction: provider }
	}
}

impl LoreService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, store: Arc::new(PgChunkStore::new(db)), providers: Providers::default() }
	}

	pub fn with_components(cfg: Config, store: Arc<dyn ChunkStore>, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}

	/// Embeds one text, fail-closed: any provider failure, a missing vector,
	/// or a dimension mismatch is an error.
	pub(crate) async fn embed_single(&self, text: &str) -> Result<Vec<f32>> {
		let embeddings = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, std::slice::from_ref(&text.to_string()))
			.await?;
		let vector = embeddings.into_iter().next().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		self.check_dimensions(&vector)?;

		Ok(vector)
	}

	pub(crate) async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		let embeddings = self.providers.embedding.embed(&self.cfg.providers.embedding, texts).await?;

		if embeddings.len() != texts.len() {
			return Err(Error::Provider {
				message: "Embedding provider returned mismatched vector count.".to_string(),
			});
		}

		for vector in &embeddings {
			self.check_dimensions(vector)?;
		}

		Ok(embeddings)
	}

	fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
		if vector.len() != self.cfg.providers.embedding.dimensions as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(())
	}
}
