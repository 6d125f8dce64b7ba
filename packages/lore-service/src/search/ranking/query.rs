use std::collections::HashSet;

use lore_config::Expansion;
use lore_domain::{query, stopwords};

/// Expansion variants are only worth their embedding calls when the primary
/// query came back thin or unconvincing.
pub fn should_expand(
	candidate_count: usize,
	top_score: f32,
	wanted: usize,
	min_top_score: f32,
) -> bool {
	candidate_count < wanted || top_score < min_top_score
}

/// Derives up to `cfg.max_variants` deduplicated phrasings of a query: the
/// original, an interrogative-stripped variant, and a keyword-only variant.
/// The original always comes first so downstream merging can give it
/// precedence.
pub fn expand_query(raw_query: &str, cfg: &Expansion) -> Vec<String> {
	let mut out = Vec::new();
	let mut seen = HashSet::new();

	push_variant(&mut out, &mut seen, raw_query);

	if query::leading_interrogative(raw_query).is_some() {
		push_variant(&mut out, &mut seen, &strip_interrogative(raw_query));
	}
	if raw_query.split_whitespace().count() > cfg.keyword_min_words as usize {
		push_variant(&mut out, &mut seen, &keywords_only(raw_query, cfg.min_token_len));
	}

	out.truncate(cfg.max_variants as usize);

	out
}

fn push_variant(out: &mut Vec<String>, seen: &mut HashSet<String>, value: &str) {
	let trimmed = value.trim();

	if trimmed.is_empty() {
		return;
	}

	let key = trimmed.to_lowercase();

	if seen.insert(key) {
		out.push(trimmed.to_string());
	}
}

/// Drops the leading question word and an immediately following auxiliary,
/// plus any trailing question mark.
fn strip_interrogative(raw_query: &str) -> String {
	let mut words = raw_query.split_whitespace();

	words.next();

	let mut rest: Vec<&str> = words.collect();

	if let Some(first) = rest.first()
		&& stopwords::is_auxiliary(first.to_lowercase().as_str())
	{
		rest.remove(0);
	}

	rest.join(" ").trim_end_matches('?').trim().to_string()
}

/// Keyword-only reduction: lowercase, strip punctuation, drop stopwords and
/// short tokens.
fn keywords_only(raw_query: &str, min_token_len: usize) -> String {
	let mut normalized = String::with_capacity(raw_query.len());

	for ch in raw_query.chars() {
		if ch.is_alphanumeric() {
			normalized.extend(ch.to_lowercase());
		} else {
			normalized.push(' ');
		}
	}

	normalized
		.split_whitespace()
		.filter(|token| token.chars().count() >= min_token_len)
		.filter(|token| !stopwords::is_stopword(token))
		.collect::<Vec<_>>()
		.join(" ")
}

#[cfg(test)]
mod tests {
	use super::*;

	fn cfg() -> Expansion {
		Expansion::default()
	}

	#[test]
	fn original_query_always_comes_first() {
		let variants = expand_query("what is React", &cfg());

		assert_eq!(variants[0], "what is React");
	}

	#[test]
	fn interrogative_lead_is_stripped() {
		let variants = expand_query("what is React", &cfg());

		assert!(variants.iter().any(|variant| variant == "React"));
	}

	#[test]
	fn long_queries_gain_a_keyword_variant() {
		let variants = expand_query("how do I configure the deployment pipeline for staging", &cfg());

		assert!(variants.len() >= 2);
		assert!(variants.iter().any(|variant| variant == "configure deployment pipeline staging"));
	}

	#[test]
	fn variants_are_deduplicated_case_insensitively() {
		let variants = expand_query("React", &cfg());

		assert_eq!(variants, vec!["React".to_string()]);
	}

	#[test]
	fn variant_count_is_bounded() {
		let variants =
			expand_query("why would the asynchronous replication lag keep growing overnight", &cfg());

		assert!(!variants.is_empty());
		assert!(variants.len() <= 3);
	}

	#[test]
	fn expansion_triggers_on_thin_or_weak_results() {
		assert!(should_expand(3, 0.9, 18, 0.75));
		assert!(should_expand(18, 0.4, 18, 0.75));
		assert!(!should_expand(18, 0.9, 18, 0.75));
	}
}
