use std::sync::Arc;

use lore_service::{EmbeddingProvider, LoreService, Providers};
use lore_testkit::{MemoryChunkStore, StaticExtraction, test_config};

pub const DIMENSIONS: u32 = 3;

pub fn service_with(
	store: Arc<MemoryChunkStore>,
	embedding: Arc<dyn EmbeddingProvider>,
) -> LoreService {
	service_with_extraction(store, embedding, "")
}

pub fn service_with_extraction(
	store: Arc<MemoryChunkStore>,
	embedding: Arc<dyn EmbeddingProvider>,
	extracted_text: &str,
) -> LoreService {
	let providers =
		Providers::new(embedding, Arc::new(StaticExtraction { text: extracted_text.to_string() }));

	LoreService::with_components(test_config(DIMENSIONS), store, providers)
}

/// A unit vector whose cosine against `[1, 0, 0]` equals `target`.
pub fn vector_with_similarity(target: f32) -> Vec<f32> {
	vec![target, (1.0 - target * target).max(0.0).sqrt(), 0.0]
}
