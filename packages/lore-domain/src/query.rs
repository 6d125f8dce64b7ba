use std::sync::LazyLock;

use regex::Regex;

pub const INTERROGATIVES: &[&str] = &["how", "what", "when", "where", "which", "who", "why"];

static QUOTED: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#""[^"]+"|“[^”]+”"#).expect("quoted-phrase pattern is valid")
});

/// Shape signals of a raw query that drive the threshold policy and
/// expansion: how long it is, whether it opens with a question word, and
/// whether the user quoted a phrase.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryShape {
	pub word_count: usize,
	pub interrogative: bool,
	pub quoted: bool,
}

pub fn analyze(query: &str) -> QueryShape {
	QueryShape {
		word_count: query.split_whitespace().count(),
		interrogative: contains_interrogative(query),
		quoted: QUOTED.is_match(query),
	}
}

/// The query's leading word when it is an interrogative, lowercased.
pub fn leading_interrogative(query: &str) -> Option<&'static str> {
	let first = query.split_whitespace().next()?;
	let normalized = first.trim_matches(|ch: char| !ch.is_alphanumeric()).to_lowercase();

	INTERROGATIVES.iter().copied().find(|word| *word == normalized)
}

pub fn contains_interrogative(query: &str) -> bool {
	query.split_whitespace().any(|word| {
		let normalized = word.trim_matches(|ch: char| !ch.is_alphanumeric()).to_lowercase();

		INTERROGATIVES.contains(&normalized.as_str())
	})
}
