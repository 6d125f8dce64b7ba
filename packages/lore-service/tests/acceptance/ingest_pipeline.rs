use std::sync::Arc;

use lore_service::{
	DocumentDeleteRequest, DocumentGetRequest, DocumentListRequest, Error, IngestRequest,
	SearchRequest,
};
use lore_testkit::{MemoryChunkStore, StaticEmbedding};

use crate::suite::{DIMENSIONS, service_with, service_with_extraction};

fn ingest_request(user_id: &str, title: &str, kind: &str, data: &[u8]) -> IngestRequest {
	IngestRequest {
		user_id: user_id.to_string(),
		title: title.to_string(),
		kind: kind.to_string(),
		data: data.to_vec(),
		source_url: None,
		metadata: None,
	}
}

#[tokio::test]
async fn plain_text_ingest_round_trips_through_search() {
	let store = Arc::new(MemoryChunkStore::new());
	let embedding = Arc::new(StaticEmbedding::new(DIMENSIONS as usize));
	let service = service_with(store.clone(), embedding);
	let body = b"Ownership rules for borrowed values.";
	let response =
		service.ingest(ingest_request("user-a", "Rust notes", "txt", body)).await.unwrap();

	assert_eq!(response.chunk_count, 1);
	assert_eq!(store.chunk_count("user-a"), 1);

	// The identical text embeds identically, so the chunk comes back at the
	// top of a search.
	let found = service
		.search(SearchRequest {
			user_id: "user-a".to_string(),
			query: "Ownership rules for borrowed values.".to_string(),
			limit: None,
			min_similarity: None,
			include_metadata: Some(true),
			explain: None,
		})
		.await
		.unwrap();

	assert_eq!(found.items.len(), 1);
	assert!(found.items[0].score > 0.9);
	assert_eq!(found.items[0].doc_title, "Rust notes");
	assert!(found.items[0].metadata.is_some());
}

#[tokio::test]
async fn binary_documents_go_through_the_extraction_provider() {
	let store = Arc::new(MemoryChunkStore::new());
	let embedding = Arc::new(StaticEmbedding::new(DIMENSIONS as usize));
	let service = service_with_extraction(
		store.clone(),
		embedding,
		"Body text recovered from the binary payload.",
	);
	let response = service
		.ingest(ingest_request("user-a", "Manual", "pdf", &[0x25, 0x50, 0x44, 0x46]))
		.await
		.unwrap();

	assert_eq!(response.chunk_count, 1);

	let chunks = {
		let listed = service
			.list_documents(DocumentListRequest { user_id: "user-a".to_string() })
			.await
			.unwrap();

		assert_eq!(listed.documents.len(), 1);
		assert_eq!(listed.documents[0].kind.as_str(), "pdf");

		store.chunk_count("user-a")
	};

	assert_eq!(chunks, 1);
}

#[tokio::test]
async fn unknown_kinds_and_empty_payloads_are_rejected() {
	let store = Arc::new(MemoryChunkStore::new());
	let embedding = Arc::new(StaticEmbedding::new(DIMENSIONS as usize));
	let service = service_with(store, embedding);

	let err =
		service.ingest(ingest_request("user-a", "Doc", "rtf", b"payload")).await.unwrap_err();

	assert!(matches!(err, Error::InvalidRequest { .. }));

	let err = service.ingest(ingest_request("user-a", "Doc", "txt", b"")).await.unwrap_err();

	assert!(matches!(err, Error::InvalidRequest { .. }));

	let err =
		service.ingest(ingest_request("user-a", "Doc", "txt", b"  \n\t  ")).await.unwrap_err();

	assert!(matches!(err, Error::InvalidRequest { .. }));
}

#[tokio::test]
async fn delete_cascades_to_chunks() {
	let store = Arc::new(MemoryChunkStore::new());
	let embedding = Arc::new(StaticEmbedding::new(DIMENSIONS as usize));
	let service = service_with(store.clone(), embedding);
	let response = service
		.ingest(ingest_request("user-a", "Ephemeral", "txt", b"Soon to be deleted."))
		.await
		.unwrap();

	assert_eq!(store.chunk_count("user-a"), 1);

	service
		.delete_document(DocumentDeleteRequest {
			user_id: "user-a".to_string(),
			doc_id: response.doc_id,
		})
		.await
		.unwrap();

	assert_eq!(store.chunk_count("user-a"), 0);

	let err = service
		.delete_document(DocumentDeleteRequest {
			user_id: "user-a".to_string(),
			doc_id: response.doc_id,
		})
		.await
		.unwrap_err();

	assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn documents_are_fetched_by_owner_only() {
	let store = Arc::new(MemoryChunkStore::new());
	let embedding = Arc::new(StaticEmbedding::new(DIMENSIONS as usize));
	let service = service_with(store, embedding);
	let response =
		service.ingest(ingest_request("user-a", "Owned", "txt", b"Owner-scoped body.")).await.unwrap();

	let fetched = service
		.get_document(DocumentGetRequest {
			user_id: "user-a".to_string(),
			doc_id: response.doc_id,
		})
		.await
		.unwrap();

	assert_eq!(fetched.document.title, "Owned");
	assert_eq!(fetched.document.content_hash, response.content_hash);

	let err = service
		.get_document(DocumentGetRequest {
			user_id: "user-b".to_string(),
			doc_id: response.doc_id,
		})
		.await
		.unwrap_err();

	assert!(matches!(err, Error::NotFound { .. }));
}
