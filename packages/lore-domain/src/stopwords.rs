//! Closed word lists backing query expansion and keyword extraction. Kept as
//! explicit sorted tables so behavior is independently verifiable.

/// Determiners, conjunctions, prepositions, pronouns, and auxiliary verbs
/// that carry no retrieval signal. Sorted for binary search.
const STOPWORDS: &[&str] = &[
	"a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
	"because", "been", "before", "being", "between", "both", "but", "by", "can", "could", "did",
	"do", "does", "doing", "down", "during", "each", "few", "for", "from", "further", "had", "has",
	"have", "having", "he", "her", "here", "hers", "him", "his", "how", "i", "if", "in", "into",
	"is", "it", "its", "just", "me", "more", "most", "my", "no", "nor", "not", "of", "off", "on",
	"once", "only", "or", "other", "our", "ours", "out", "over", "own", "same", "she", "should",
	"so", "some", "such", "than", "that", "the", "their", "theirs", "them", "then", "there",
	"these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "very",
	"was", "we", "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will",
	"with", "would", "you", "your", "yours",
];

/// Auxiliary verbs that often trail an interrogative lead word.
const AUXILIARIES: &[&str] = &[
	"am", "are", "can", "could", "did", "do", "does", "had", "has", "have", "is", "may", "might",
	"should", "was", "were", "will", "would",
];

pub fn is_stopword(word: &str) -> bool {
	STOPWORDS.binary_search(&word).is_ok()
}

pub fn is_auxiliary(word: &str) -> bool {
	AUXILIARIES.binary_search(&word).is_ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tables_are_sorted_for_binary_search() {
		assert!(STOPWORDS.windows(2).all(|pair| pair[0] < pair[1]));
		assert!(AUXILIARIES.windows(2).all(|pair| pair[0] < pair[1]));
	}

	#[test]
	fn recognizes_stopwords() {
		assert!(is_stopword("the"));
		assert!(is_stopword("would"));
		assert!(!is_stopword("retrieval"));
	}

	#[test]
	fn recognizes_auxiliaries() {
		assert!(is_auxiliary("is"));
		assert!(!is_auxiliary("react"));
	}
}
