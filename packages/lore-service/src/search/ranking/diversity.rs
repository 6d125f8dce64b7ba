use std::collections::{HashMap, HashSet};

use super::retrieval;
use crate::search::{Candidate, ChunkArena};

pub(crate) fn distinct_documents(candidates: &[Candidate], arena: &ChunkArena) -> usize {
	let mut docs = HashSet::new();

	for candidate in candidates {
		docs.insert(arena.get(candidate.arena_idx).doc_id);
	}

	docs.len()
}

/// Redistributes a ranked list across source documents so no single document
/// monopolizes the result set. The first pass allows at most
/// `ceil(target / distinct_docs)` results per document in rank order; a
/// second pass fills remaining slots from the best leftovers regardless of
/// document; the combined set re-sorts by score. With all results from one
/// document this degrades to a plain top-N.
pub(crate) fn diversify(
	candidates: Vec<Candidate>,
	arena: &ChunkArena,
	target: usize,
) -> Vec<Candidate> {
	if candidates.len() <= target {
		return candidates;
	}

	let distinct = distinct_documents(&candidates, arena);

	if distinct <= 1 {
		let mut out = candidates;

		out.truncate(target);

		return out;
	}

	let per_doc_cap = target.div_ceil(distinct);
	let mut taken_per_doc: HashMap<uuid::Uuid, usize> = HashMap::new();
	let mut selected = Vec::with_capacity(target);
	let mut leftovers = Vec::new();

	for candidate in candidates {
		if selected.len() >= target {
			leftovers.push(candidate);

			continue;
		}

		let doc_id = arena.get(candidate.arena_idx).doc_id;
		let taken = taken_per_doc.entry(doc_id).or_insert(0);

		if *taken < per_doc_cap {
			*taken += 1;

			selected.push(candidate);
		} else {
			leftovers.push(candidate);
		}
	}

	for candidate in leftovers {
		if selected.len() >= target {
			break;
		}

		selected.push(candidate);
	}

	retrieval::sort_candidates(&mut selected, arena);

	selected
}
