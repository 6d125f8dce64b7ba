use std::collections::HashSet;

use lore_config::Boost;
use lore_domain::stopwords;

use super::retrieval;
use crate::search::{Candidate, ChunkArena};

/// Query keywords surviving punctuation stripping, lowercasing, and the
/// stopword and minimum-length filters, deduplicated in order.
pub fn extract_keywords(raw_query: &str, cfg: &Boost) -> Vec<String> {
	let mut normalized = String::with_capacity(raw_query.len());

	for ch in raw_query.chars() {
		if ch.is_alphanumeric() {
			normalized.extend(ch.to_lowercase());
		} else {
			normalized.push(' ');
		}
	}

	let mut out = Vec::new();
	let mut seen = HashSet::new();

	for token in normalized.split_whitespace() {
		if token.chars().count() < cfg.min_keyword_len {
			continue;
		}
		if stopwords::is_stopword(token) {
			continue;
		}
		if seen.insert(token.to_string()) {
			out.push(token.to_string());
		}
	}

	out
}

/// Rewards literal keyword overlap: longer keywords earn more (capped per
/// keyword), matches in the opening window earn an early-mention bonus, and
/// the per-result total is capped so a boost can never override genuine
/// semantic dissimilarity. Boosts only ever raise a score, and the boosted
/// score never exceeds `cfg.score_cap`. Applied to every candidate before
/// any truncation, then the list re-sorts by boosted score.
pub(crate) fn apply_keyword_boost(
	candidates: &mut Vec<Candidate>,
	arena: &ChunkArena,
	keywords: &[String],
	cfg: &Boost,
) {
	if !keywords.is_empty() {
		for candidate in candidates.iter_mut() {
			let content = arena.get(candidate.arena_idx).text.to_lowercase();
			let boost = keyword_boost_for(&content, keywords, cfg);

			candidate.boost = boost;
			candidate.score =
				(candidate.similarity + boost).min(cfg.score_cap).max(candidate.similarity);
		}
	}

	retrieval::sort_candidates(candidates, arena);
}

fn keyword_boost_for(content_lower: &str, keywords: &[String], cfg: &Boost) -> f32 {
	let mut total = 0.0_f32;

	for keyword in keywords {
		let Some(first_char_pos) = find_whole_word(content_lower, keyword) else {
			continue;
		};
		let mut boost = (keyword.chars().count() as f32 * cfg.per_char).min(cfg.per_keyword_cap);

		if first_char_pos < cfg.early_window {
			boost += cfg.early_bonus;
		}

		total += boost;
	}

	total.min(cfg.max_total)
}

/// Char position of the first whole-word occurrence of `needle` in the
/// already-lowercased haystack, or None.
fn find_whole_word(haystack: &str, needle: &str) -> Option<usize> {
	if needle.is_empty() {
		return None;
	}

	let mut search_from = 0_usize;

	while let Some(pos) = haystack[search_from..].find(needle) {
		let start = search_from + pos;
		let end = start + needle.len();
		let boundary_before = haystack[..start]
			.chars()
			.next_back()
			.map(|ch| !ch.is_alphanumeric())
			.unwrap_or(true);
		let boundary_after =
			haystack[end..].chars().next().map(|ch| !ch.is_alphanumeric()).unwrap_or(true);

		if boundary_before && boundary_after {
			return Some(haystack[..start].chars().count());
		}

		search_from = end;
	}

	None
}
