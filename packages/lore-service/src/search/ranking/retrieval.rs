use std::{cmp::Ordering, collections::HashSet};

use crate::search::{Candidate, ChunkArena};
use lore_domain::similarity;

/// Scores every chunk in the arena against one query vector and keeps the
/// top `take`, sorted by similarity descending. Chunks whose embedding does
/// not match the query dimensionality are excluded from search.
pub(crate) fn score_chunks(arena: &ChunkArena, query_vector: &[f32], take: usize) -> Vec<Candidate> {
	let mut out = Vec::new();
	let mut skipped = 0_usize;

	for arena_idx in 0..arena.len() {
		let chunk = arena.get(arena_idx);
		let score = match similarity::cosine_similarity(query_vector, &chunk.embedding) {
			Ok(score) => score,
			Err(err) => {
				tracing::debug!(chunk_id = %chunk.chunk_id, error = %err, "Skipping chunk with mismatched embedding.");

				skipped += 1;

				continue;
			},
		};

		out.push(Candidate {
			arena_idx,
			similarity: score,
			boost: 0.0,
			score,
			is_context: false,
			anchor_index: None,
		});
	}

	if skipped > 0 {
		tracing::warn!(skipped, "Excluded chunks with mismatched embedding dimensionality.");
	}

	sort_candidates(&mut out, arena);
	out.truncate(take);

	out
}

/// Merges per-variant candidate lists in priority order (primary first).
/// Two chunks are duplicates when a fixed-length prefix of their content is
/// byte-identical; the first occurrence encountered wins, deterministically.
pub(crate) fn merge_candidates(
	variant_lists: Vec<Vec<Candidate>>,
	arena: &ChunkArena,
	dedupe_prefix_len: usize,
) -> Vec<Candidate> {
	let mut seen_prefixes: HashSet<&[u8]> = HashSet::new();
	let mut out = Vec::new();

	for list in &variant_lists {
		for candidate in list {
			let text = arena.get(candidate.arena_idx).text.as_bytes();
			let prefix = &text[..text.len().min(dedupe_prefix_len)];

			if seen_prefixes.insert(prefix) {
				out.push(*candidate);
			}
		}
	}

	sort_candidates(&mut out, arena);

	out
}

pub(crate) fn sort_candidates(candidates: &mut [Candidate], arena: &ChunkArena) {
	candidates.sort_by(|a, b| {
		cmp_f32_desc(a.score, b.score)
			.then_with(|| arena.get(a.arena_idx).chunk_id.cmp(&arena.get(b.arena_idx).chunk_id))
	});
}

pub(crate) fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}
