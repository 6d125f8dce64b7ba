use lore_config::Budget;

use crate::search::SearchItem;

const TRUNCATION_MARKER: &str = "…";

/// Enforces the token budget over a score-ordered result list: individual
/// passages are truncated to `max_passage_chars`, then results accumulate
/// greedily best-first and the list is cut at the first result that would
/// push either the char or the token total over budget. A higher-scored
/// result is never dropped while a lower-scored one is kept.
pub fn apply_budget(items: Vec<SearchItem>, cfg: &Budget) -> Vec<SearchItem> {
	let mut out = Vec::with_capacity(items.len());
	let mut total_chars = 0_usize;
	let mut total_tokens = 0_usize;

	for mut item in items {
		if item.content.chars().count() > cfg.max_passage_chars {
			item.content = truncate_chars(&item.content, cfg.max_passage_chars);
			item.content.push_str(TRUNCATION_MARKER);
		}

		let chars = item.content.chars().count();
		let tokens = chars.div_ceil(4);

		if total_chars + chars > cfg.max_total_chars || total_tokens + tokens > cfg.max_total_tokens
		{
			break;
		}

		total_chars += chars;
		total_tokens += tokens;

		out.push(item);
	}

	out
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
	text.chars().take(max_chars).collect()
}
