pub use tokenizers::Tokenizer;
use unicode_segmentation::UnicodeSegmentation;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Input text is empty after cleaning.")]
	EmptyInput,
	#[error("Chunking produced no chunks for non-empty input.")]
	NoChunks,
}

#[derive(Clone, Debug)]
pub struct ChunkingConfig {
	pub max_tokens: u32,
	pub overlap_tokens: u32,
}
impl Default for ChunkingConfig {
	fn default() -> Self {
		Self { max_tokens: 500, overlap_tokens: 60 }
	}
}

#[derive(Clone, Debug)]
pub struct Chunk {
	pub chunk_index: i32,
	pub start_offset: usize,
	pub end_offset: usize,
	pub token_estimate: u32,
	pub text: String,
}

/// Tokens are counted exactly when a tokenizer is available, otherwise
/// estimated as one token per four characters.
pub fn count_tokens(text: &str, tokenizer: Option<&Tokenizer>) -> u32 {
	if let Some(tokenizer) = tokenizer {
		match tokenizer.encode(text, false) {
			Ok(encoding) => return encoding.len() as u32,
			Err(err) => {
				tracing::error!(error = %err, "Tokenizer failed to encode text; falling back to the estimate.");
			},
		}
	}

	estimate_tokens(text)
}

pub fn estimate_tokens(text: &str) -> u32 {
	if text.is_empty() {
		return 0;
	}

	(text.chars().count().div_ceil(4)).max(1) as u32
}

pub fn load_tokenizer(repo: &str) -> Result<Tokenizer, tokenizers::Error> {
	Tokenizer::from_pretrained(repo, None)
}

/// Splits text into overlapping chunks bounded by `cfg.max_tokens`, preferring
/// paragraph breaks, then sentence boundaries, then word boundaries, and only
/// hard-cutting when a single word exceeds the window. Each chunk records its
/// byte offsets into the input; consecutive chunks overlap by roughly
/// `cfg.overlap_tokens` worth of trailing text, and the next chunk's start
/// offset always strictly increases.
pub fn split_text(
	text: &str,
	cfg: &ChunkingConfig,
	tokenizer: Option<&Tokenizer>,
) -> Result<Vec<Chunk>> {
	if text.trim().is_empty() {
		return Err(Error::EmptyInput);
	}

	let segments = segment_text(text, cfg.max_tokens, tokenizer);
	let mut chunks = Vec::new();
	let mut current = String::new();
	let mut current_start = 0_usize;
	let mut last_end = 0_usize;
	let mut chunk_index = 0_i32;

	for (idx, segment) in segments {
		let candidate = format!("{current}{segment}");
		let candidate_tokens = count_tokens(candidate.as_str(), tokenizer);

		if candidate_tokens > cfg.max_tokens && !current.is_empty() {
			chunks.push(Chunk {
				chunk_index,
				start_offset: current_start,
				end_offset: last_end,
				token_estimate: count_tokens(current.as_str(), tokenizer),
				text: current.clone(),
			});

			chunk_index += 1;

			let overlap = overlap_tail(&current, cfg.overlap_tokens);

			current_start = last_end - overlap.len();
			current = overlap;
		}
		if current.is_empty() {
			current_start = idx;
		}

		current.push_str(segment);

		last_end = idx + segment.len();
	}

	if !current.is_empty() {
		chunks.push(Chunk {
			chunk_index,
			start_offset: current_start,
			end_offset: last_end,
			token_estimate: count_tokens(current.as_str(), tokenizer),
			text: current,
		});
	}
	if chunks.is_empty() {
		return Err(Error::NoChunks);
	}

	Ok(chunks)
}

/// Trailing portion of a chunk, sized by the token estimate, that seeds the
/// next chunk. Returns an empty overlap rather than the whole chunk so the
/// next start offset always moves forward.
fn overlap_tail(text: &str, overlap_tokens: u32) -> String {
	if overlap_tokens == 0 {
		return String::new();
	}

	let target_chars = overlap_tokens as usize * 4;
	let char_count = text.chars().count();

	if char_count <= target_chars {
		return String::new();
	}

	let skip = char_count - target_chars;
	let raw_start = text.char_indices().nth(skip).map(|(idx, _)| idx).unwrap_or(text.len());
	// Snap forward to the next word start so the overlap never opens mid-word.
	let tail = &text[raw_start..];
	let snapped = tail
		.char_indices()
		.skip_while(|(_, ch)| !ch.is_whitespace())
		.find(|(_, ch)| !ch.is_whitespace())
		.map(|(idx, _)| raw_start + idx)
		.unwrap_or(raw_start);
	let overlap = &text[snapped..];

	if overlap.is_empty() || overlap.len() >= text.len() {
		return String::new();
	}

	overlap.to_string()
}

/// Flattens text into contiguous segments that each fit in `max_tokens`,
/// descending from paragraphs to sentences to words to a raw character cut.
fn segment_text<'a>(
	text: &'a str,
	max_tokens: u32,
	tokenizer: Option<&Tokenizer>,
) -> Vec<(usize, &'a str)> {
	let mut out = Vec::new();

	for (par_start, paragraph) in paragraph_bounds(text) {
		if count_tokens(paragraph, tokenizer) <= max_tokens {
			out.push((par_start, paragraph));

			continue;
		}

		for (sent_idx, sentence) in paragraph.split_sentence_bound_indices() {
			let sent_start = par_start + sent_idx;

			if count_tokens(sentence, tokenizer) <= max_tokens {
				out.push((sent_start, sentence));

				continue;
			}

			for (word_idx, word) in sentence.split_word_bound_indices() {
				let word_start = sent_start + word_idx;

				if count_tokens(word, tokenizer) <= max_tokens {
					out.push((word_start, word));
				} else {
					hard_cut(word, word_start, max_tokens, &mut out);
				}
			}
		}
	}

	out
}

/// Paragraph pieces with their start offsets; blank-line separators stay
/// attached to the preceding piece so the pieces concatenate back to `text`.
fn paragraph_bounds(text: &str) -> Vec<(usize, &str)> {
	let bytes = text.as_bytes();
	let mut out = Vec::new();
	let mut start = 0_usize;
	let mut i = 0_usize;

	while i < bytes.len() {
		if bytes[i] == b'\n' && i + 1 < bytes.len() && bytes[i + 1] == b'\n' {
			let mut end = i + 2;

			while end < bytes.len() && bytes[end] == b'\n' {
				end += 1;
			}

			out.push((start, &text[start..end]));

			start = end;
			i = end;
		} else {
			i += 1;
		}
	}

	if start < text.len() {
		out.push((start, &text[start..]));
	}

	out
}

fn hard_cut<'a>(word: &'a str, word_start: usize, max_tokens: u32, out: &mut Vec<(usize, &'a str)>) {
	let window_chars = (max_tokens as usize * 4).max(1);
	let mut piece_start = 0_usize;
	let mut chars_in_piece = 0_usize;

	for (idx, _) in word.char_indices() {
		if chars_in_piece == window_chars {
			out.push((word_start + piece_start, &word[piece_start..idx]));

			piece_start = idx;
			chars_in_piece = 0;
		}

		chars_in_piece += 1;
	}

	if piece_start < word.len() {
		out.push((word_start + piece_start, &word[piece_start..word.len()]));
	}
}
