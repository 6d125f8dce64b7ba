use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use lore_service::{Error, SearchRequest};
use lore_testkit::{
	FailingEmbedding, MemoryChunkStore, SpyEmbedding, StaticEmbedding, test_chunk, test_document,
};

use crate::suite::{DIMENSIONS, service_with, vector_with_similarity};

fn search_request(user_id: &str, query: &str) -> SearchRequest {
	SearchRequest {
		user_id: user_id.to_string(),
		query: query.to_string(),
		limit: None,
		min_similarity: None,
		include_metadata: None,
		explain: None,
	}
}

#[tokio::test]
async fn interrogative_query_lowers_the_threshold_and_filters() {
	// Three chunks scoring 0.9, 0.5, and 0.1 against the query. A three-word
	// interrogative query at base 0.4 resolves to 0.4 - 0.2 - 0.08 = 0.12,
	// so the first two pass and 0.1 is excluded.
	let store = Arc::new(MemoryChunkStore::new());
	let query_vector = vec![1.0, 0.0, 0.0];

	for (label, similarity) in [("alpha", 0.9_f32), ("beta", 0.5), ("gamma", 0.1)] {
		let doc = test_document("user-a", label);
		let chunk = test_chunk(&doc, 0, &format!("{label} passage text"), vector_with_similarity(similarity));

		store.seed(doc, vec![chunk]);
	}

	let embedding =
		Arc::new(StaticEmbedding::new(DIMENSIONS as usize).with_override("what is React", query_vector));
	let service = service_with(store, embedding);
	let response = service.search(search_request("user-a", "what is React")).await.unwrap();

	assert!((response.threshold - 0.12).abs() < 1e-6);
	assert_eq!(response.items.len(), 2);
	assert!((response.items[0].similarity - 0.9).abs() < 1e-3);
	assert!((response.items[1].similarity - 0.5).abs() < 1e-3);
}

#[tokio::test]
async fn empty_chunk_store_returns_empty_results_without_error() {
	let store = Arc::new(MemoryChunkStore::new());
	let embedding = Arc::new(StaticEmbedding::new(DIMENSIONS as usize));
	let service = service_with(store, embedding);
	let response = service.search(search_request("user-a", "anything at all")).await.unwrap();

	assert!(response.items.is_empty());
}

#[tokio::test]
async fn high_confidence_hit_gains_adjacent_context() {
	// One document with five chunks; only index 2 matches. Context expansion
	// must add indexes 1 and 3 at strictly discounted scores.
	let store = Arc::new(MemoryChunkStore::new());
	let doc = test_document("user-a", "runbook");
	let chunks = (0..5)
		.map(|idx| {
			let similarity = if idx == 2 { 0.9 } else { 0.02 };

			test_chunk(&doc, idx, &format!("passage number {idx}"), vector_with_similarity(similarity))
		})
		.collect();

	store.seed(doc, chunks);

	let embedding = Arc::new(
		StaticEmbedding::new(DIMENSIONS as usize)
			.with_override("deployment checklist", vec![1.0, 0.0, 0.0]),
	);
	let service = service_with(store, embedding);
	let response = service.search(search_request("user-a", "deployment checklist")).await.unwrap();
	let anchor = response.items.iter().find(|item| item.chunk_index == 2).unwrap();

	assert!(!anchor.is_context);

	for neighbor_index in [1, 3] {
		let neighbor =
			response.items.iter().find(|item| item.chunk_index == neighbor_index).unwrap();

		assert!(neighbor.is_context);
		assert!(neighbor.score < anchor.score);
		assert_eq!(neighbor.anchor_index, Some(2));
	}

	assert_eq!(response.items.len(), 3);
}

#[tokio::test]
async fn search_never_crosses_users() {
	let store = Arc::new(MemoryChunkStore::new());
	let doc = test_document("user-a", "private notes");
	let chunk = test_chunk(&doc, 0, "private passage", vec![1.0, 0.0, 0.0]);

	store.seed(doc, vec![chunk]);

	let embedding = Arc::new(
		StaticEmbedding::new(DIMENSIONS as usize).with_override("private passage", vec![1.0, 0.0, 0.0]),
	);
	let service = service_with(store, embedding);
	let response = service.search(search_request("user-b", "private passage")).await.unwrap();

	assert!(response.items.is_empty());
}

#[tokio::test]
async fn primary_embedding_failure_fails_the_whole_search() {
	let store = Arc::new(MemoryChunkStore::new());
	let doc = test_document("user-a", "notes");
	let chunk = test_chunk(&doc, 0, "some passage", vec![1.0, 0.0, 0.0]);

	store.seed(doc, vec![chunk]);

	let service = service_with(store, Arc::new(FailingEmbedding));
	let err = service.search(search_request("user-a", "anything")).await.unwrap_err();

	assert!(matches!(err, Error::Provider { .. }));
}

#[tokio::test]
async fn strong_primary_results_skip_expansion_variants() {
	let store = Arc::new(MemoryChunkStore::new());
	let doc = test_document("user-a", "react docs");

	let chunks = (0..3)
		.map(|idx| test_chunk(&doc, idx, &format!("passage {idx}"), vec![1.0, 0.0, 0.0]))
		.collect();

	store.seed(doc, chunks);

	let calls = Arc::new(AtomicUsize::new(0));
	let inner = StaticEmbedding::new(DIMENSIONS as usize).with_override("what is React", vec![1.0, 0.0, 0.0]);
	let embedding = Arc::new(SpyEmbedding { inner, calls: calls.clone() });
	let service = service_with(store, embedding);
	let mut request = search_request("user-a", "what is React");

	request.limit = Some(1);

	let response = service.search(request).await.unwrap();

	// Three perfect-score candidates satisfy overfetch x limit, so the
	// stripped variant is never embedded.
	assert_eq!(calls.load(Ordering::SeqCst), 1);
	assert_eq!(response.expanded_queries.len(), 1);
}

#[tokio::test]
async fn invalid_requests_are_rejected_up_front() {
	let store = Arc::new(MemoryChunkStore::new());
	let embedding = Arc::new(StaticEmbedding::new(DIMENSIONS as usize));
	let service = service_with(store, embedding);

	let err = service.search(search_request("", "query")).await.unwrap_err();

	assert!(matches!(err, Error::InvalidRequest { .. }));

	let err = service.search(search_request("user-a", "   ")).await.unwrap_err();

	assert!(matches!(err, Error::InvalidRequest { .. }));

	let mut request = search_request("user-a", "query");

	request.min_similarity = Some(1.5);

	let err = service.search(request).await.unwrap_err();

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn explain_records_the_stage_trajectory() {
	let store = Arc::new(MemoryChunkStore::new());
	let doc = test_document("user-a", "notes");
	let chunk = test_chunk(&doc, 0, "a passage", vec![1.0, 0.0, 0.0]);

	store.seed(doc, vec![chunk]);

	let embedding = Arc::new(
		StaticEmbedding::new(DIMENSIONS as usize).with_override("a passage", vec![1.0, 0.0, 0.0]),
	);
	let service = service_with(store, embedding);
	let mut request = search_request("user-a", "a passage");

	request.explain = Some(true);

	let response = service.search(request).await.unwrap();
	let trajectory = response.trajectory.unwrap();
	let names: Vec<&str> =
		trajectory.stages.iter().map(|stage| stage.stage_name.as_str()).collect();

	assert_eq!(
		names,
		vec![
			"threshold",
			"chunk_fetch",
			"retrieve",
			"expand",
			"dedupe",
			"filter",
			"boost",
			"diversify",
			"context_expand",
			"budget",
		]
	);
}
