pub mod ranking;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{Error, LoreService, Result, store::StoredChunk};
use lore_domain::query;

#[derive(Clone, Debug, Deserialize)]
pub struct SearchRequest {
	pub user_id: String,
	pub query: String,
	pub limit: Option<u32>,
	pub min_similarity: Option<f32>,
	pub include_metadata: Option<bool>,
	pub explain: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchItem {
	pub chunk_id: Uuid,
	pub doc_id: Uuid,
	pub doc_title: String,
	pub chunk_index: i32,
	pub content: String,
	pub score: f32,
	pub similarity: f32,
	pub keyword_boost: f32,
	pub is_context: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub anchor_index: Option<i32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub metadata: Option<Value>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchResponse {
	pub items: Vec<SearchItem>,
	pub threshold: f32,
	pub expanded_queries: Vec<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub trajectory: Option<SearchTrajectory>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchTrajectory {
	pub stages: Vec<SearchTrajectoryStage>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchTrajectoryStage {
	pub stage_order: u32,
	pub stage_name: String,
	pub stats: Value,
}

/// The user's chunk set, fetched once per query and indexed by
/// `(doc_id, chunk_index)` so neighbor lookups during context expansion cost
/// nothing extra.
pub(crate) struct ChunkArena {
	chunks: Vec<StoredChunk>,
	by_position: HashMap<(Uuid, i32), usize>,
}
impl ChunkArena {
	pub(crate) fn new(chunks: Vec<StoredChunk>) -> Self {
		let mut by_position = HashMap::with_capacity(chunks.len());

		for (idx, chunk) in chunks.iter().enumerate() {
			by_position.insert((chunk.doc_id, chunk.chunk_index), idx);
		}

		Self { chunks, by_position }
	}

	pub(crate) fn len(&self) -> usize {
		self.chunks.len()
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.chunks.is_empty()
	}

	pub(crate) fn get(&self, idx: usize) -> &StoredChunk {
		&self.chunks[idx]
	}

	pub(crate) fn position(&self, doc_id: Uuid, chunk_index: i32) -> Option<usize> {
		self.by_position.get(&(doc_id, chunk_index)).copied()
	}
}

/// One scored passage flowing through the pipeline. `similarity` is the raw
/// cosine score; `score` folds in the keyword boost or, for synthetic
/// context entries, the anchor discount.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Candidate {
	pub(crate) arena_idx: usize,
	pub(crate) similarity: f32,
	pub(crate) boost: f32,
	pub(crate) score: f32,
	pub(crate) is_context: bool,
	pub(crate) anchor_index: Option<i32>,
}

struct TrajectoryBuilder {
	explain: bool,
	stages: Vec<SearchTrajectoryStage>,
	stage_order: u32,
}
impl TrajectoryBuilder {
	fn new(explain: bool) -> Self {
		Self { explain, stages: Vec::new(), stage_order: 0 }
	}

	fn push(&mut self, stage_name: &str, stats: Value) {
		if !self.explain {
			return;
		}

		self.stages.push(SearchTrajectoryStage {
			stage_order: self.stage_order,
			stage_name: stage_name.to_string(),
			stats,
		});

		self.stage_order += 1;
	}

	fn into_trajectory(self) -> Option<SearchTrajectory> {
		if !self.explain {
			return None;
		}

		Some(SearchTrajectory { stages: self.stages })
	}
}

impl LoreService {
	/// Runs the whole retrieval pipeline for one query. Fails closed on the
	/// primary embedding and the initial chunk fetch; every later stage
	/// degrades gracefully. An empty result list is a valid outcome, distinct
	/// from failure.
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let user_id = req.user_id.trim();
		let raw_query = req.query.trim();

		if user_id.is_empty() {
			return Err(Error::InvalidRequest { message: "user_id is required.".to_string() });
		}
		if raw_query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}
		if let Some(min_similarity) = req.min_similarity
			&& !(0.0..=1.0).contains(&min_similarity)
		{
			return Err(Error::InvalidRequest {
				message: "min_similarity must be in the range 0.0-1.0.".to_string(),
			});
		}

		let cfg = &self.cfg.search;
		let limit = req.limit.unwrap_or(cfg.limit).max(1) as usize;
		let include_metadata = req.include_metadata.unwrap_or(false);
		let mut trajectory = TrajectoryBuilder::new(req.explain.unwrap_or(false));

		let base = req.min_similarity.unwrap_or(cfg.base_threshold);
		let shape = query::analyze(raw_query);
		let threshold = ranking::policy::resolve_threshold(&shape, base, &cfg.threshold);

		trajectory.push(
			"threshold",
			serde_json::json!({
				"base": base,
				"word_count": shape.word_count,
				"interrogative": shape.interrogative,
				"quoted": shape.quoted,
				"resolved": threshold,
			}),
		);

		let chunks = self.store.get_user_chunks(user_id).await?;
		let arena = ChunkArena::new(chunks);

		trajectory.push("chunk_fetch", serde_json::json!({ "chunks": arena.len() }));

		if arena.is_empty() {
			return Ok(SearchResponse {
				items: Vec::new(),
				threshold,
				expanded_queries: vec![raw_query.to_string()],
				trajectory: trajectory.into_trajectory(),
			});
		}

		let overfetch = (cfg.overfetch as usize).saturating_mul(limit).max(limit);
		let primary_vector = self.embed_single(raw_query).await?;
		let primary = ranking::retrieval::score_chunks(&arena, &primary_vector, overfetch);
		let primary_top = primary.first().map(|candidate| candidate.similarity).unwrap_or(0.0);

		trajectory.push(
			"retrieve",
			serde_json::json!({ "candidates": primary.len(), "top_score": primary_top }),
		);

		let mut expanded_queries = vec![raw_query.to_string()];
		let mut variant_lists = vec![primary];

		if cfg.expansion.enabled
			&& ranking::query::should_expand(
				variant_lists[0].len(),
				primary_top,
				overfetch,
				cfg.expansion.min_top_score,
			) {
			let variants = ranking::query::expand_query(raw_query, &cfg.expansion);
			let extra: Vec<String> = variants.into_iter().skip(1).collect();

			if !extra.is_empty() {
				let embedded = self.embed_batch(&extra).await;

				match embedded {
					Ok(vectors) =>
						for (text, vector) in extra.into_iter().zip(vectors) {
							variant_lists.push(ranking::retrieval::score_chunks(
								&arena, &vector, overfetch,
							));
							expanded_queries.push(text);
						},
					Err(err) => {
						tracing::warn!(
							error = %err,
							"Expansion embedding failed; continuing with the primary query only."
						);
					},
				}
			}
		}

		trajectory.push(
			"expand",
			serde_json::json!({
				"variants": expanded_queries.len(),
				"queries": expanded_queries,
			}),
		);

		let merged_total: usize = variant_lists.iter().map(Vec::len).sum();
		let mut candidates =
			ranking::retrieval::merge_candidates(variant_lists, &arena, cfg.dedupe_prefix_len);

		trajectory.push(
			"dedupe",
			serde_json::json!({ "raw_candidates": merged_total, "deduped": candidates.len() }),
		);

		let before_filter = candidates.len();

		candidates.retain(|candidate| candidate.similarity >= threshold);

		trajectory.push(
			"filter",
			serde_json::json!({
				"threshold": threshold,
				"before": before_filter,
				"after": candidates.len(),
			}),
		);

		let keywords = ranking::text::extract_keywords(raw_query, &cfg.boost);

		ranking::text::apply_keyword_boost(&mut candidates, &arena, &keywords, &cfg.boost);
		trajectory.push(
			"boost",
			serde_json::json!({
				"keywords": keywords,
				"boosted": candidates.iter().filter(|candidate| candidate.boost > 0.0).count(),
			}),
		);

		let candidates = if cfg.diversity.enabled {
			ranking::diversity::diversify(candidates, &arena, limit)
		} else {
			let mut candidates = candidates;

			candidates.truncate(limit);

			candidates
		};

		trajectory.push(
			"diversify",
			serde_json::json!({
				"enabled": cfg.diversity.enabled,
				"selected": candidates.len(),
				"documents": ranking::diversity::distinct_documents(&candidates, &arena),
			}),
		);

		let before_context = candidates.len();
		let candidates = ranking::context::expand_context(candidates, &arena, &cfg.context);

		trajectory.push(
			"context_expand",
			serde_json::json!({
				"high_confidence": cfg.context.high_confidence,
				"before": before_context,
				"after": candidates.len(),
			}),
		);

		let items = build_items(&candidates, &arena, include_metadata);
		let before_budget = items.len();
		let items = ranking::budget::apply_budget(items, &cfg.budget);

		trajectory.push(
			"budget",
			serde_json::json!({ "before": before_budget, "after": items.len() }),
		);

		Ok(SearchResponse {
			items,
			threshold,
			expanded_queries,
			trajectory: trajectory.into_trajectory(),
		})
	}
}

fn build_items(candidates: &[Candidate], arena: &ChunkArena, include_metadata: bool) -> Vec<SearchItem> {
	let mut items = Vec::with_capacity(candidates.len());

	for candidate in candidates {
		let chunk = arena.get(candidate.arena_idx);
		let metadata = include_metadata.then(|| {
			serde_json::json!({
				"start_offset": chunk.start_offset,
				"end_offset": chunk.end_offset,
				"token_estimate": chunk.token_estimate,
			})
		});

		items.push(SearchItem {
			chunk_id: chunk.chunk_id,
			doc_id: chunk.doc_id,
			doc_title: chunk.doc_title.clone(),
			chunk_index: chunk.chunk_index,
			content: chunk.text.clone(),
			score: candidate.score,
			similarity: candidate.similarity,
			keyword_boost: candidate.boost,
			is_context: candidate.is_context,
			anchor_index: candidate.anchor_index,
			metadata,
		});
	}

	items
}

#[cfg(test)]
pub(crate) mod tests {
	use uuid::Uuid;

	use crate::{search::ChunkArena, store::StoredChunk};

	pub(crate) fn doc_id_for(label: &str) -> Uuid {
		let mut acc: u128 = 0xcafe;

		for byte in label.bytes() {
			acc = acc.wrapping_mul(131).wrapping_add(byte as u128);
		}

		Uuid::from_u128(acc)
	}

	pub(crate) fn chunk(doc: &str, index: i32, text: &str, embedding: Vec<f32>) -> StoredChunk {
		StoredChunk {
			chunk_id: Uuid::new_v4(),
			doc_id: doc_id_for(doc),
			doc_title: doc.to_string(),
			chunk_index: index,
			start_offset: 0,
			end_offset: text.len() as i32,
			token_estimate: (text.len() / 4).max(1) as i32,
			text: text.to_string(),
			embedding,
		}
	}

	pub(crate) fn arena_of(chunks: Vec<StoredChunk>) -> ChunkArena {
		ChunkArena::new(chunks)
	}
}
