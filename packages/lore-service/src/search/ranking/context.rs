use std::collections::HashSet;

use lore_config::Context;

use super::retrieval;
use crate::search::{Candidate, ChunkArena};

/// For every high-confidence hit, synthesizes result entries for the
/// document-adjacent chunks inside `cfg.radius`, at a score discounted per
/// index step and always strictly below the anchor. Neighbor lookups hit the
/// per-query arena index, not the store. The merged list re-sorts and is
/// capped at `cfg.max_results`, which exceeds the pre-expansion limit to
/// make room for the added context.
pub(crate) fn expand_context(
	candidates: Vec<Candidate>,
	arena: &ChunkArena,
	cfg: &Context,
) -> Vec<Candidate> {
	let mut present: HashSet<usize> =
		candidates.iter().map(|candidate| candidate.arena_idx).collect();
	let mut out = candidates.clone();

	for candidate in &candidates {
		if candidate.is_context || candidate.score < cfg.high_confidence {
			continue;
		}

		let anchor = arena.get(candidate.arena_idx);

		for distance in 1..=cfg.radius as i32 {
			for neighbor_index in [anchor.chunk_index - distance, anchor.chunk_index + distance] {
				if neighbor_index < 0 {
					continue;
				}

				let Some(neighbor_idx) = arena.position(anchor.doc_id, neighbor_index) else {
					continue;
				};

				if !present.insert(neighbor_idx) {
					continue;
				}

				let discounted =
					(candidate.score - cfg.discount_per_step * distance as f32).max(0.0);

				out.push(Candidate {
					arena_idx: neighbor_idx,
					similarity: discounted,
					boost: 0.0,
					score: discounted,
					is_context: true,
					anchor_index: Some(anchor.chunk_index),
				});
			}
		}
	}

	retrieval::sort_candidates(&mut out, arena);
	out.truncate(cfg.max_results as usize);

	out
}
