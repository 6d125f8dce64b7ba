use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub chunking: Chunking,
	#[serde(default)]
	pub ingest: Ingest,
	#[serde(default)]
	pub search: Search,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	#[serde(default)]
	pub bind_localhost_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub extraction: ExtractionProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default = "default_embed_batch_size")]
	pub batch_size: u32,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractionProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Chunking {
	pub max_tokens: u32,
	pub overlap_tokens: u32,
	pub tokenizer_repo: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ingest {
	pub max_document_bytes: usize,
}
impl Default for Ingest {
	fn default() -> Self {
		Self { max_document_bytes: 4 * 1_024 * 1_024 }
	}
}

/// The whole retrieval pipeline is tuned from this one tree; the individual
/// policy structs default to the canonical values so a minimal config file
/// only has to name the sections it overrides.
#[derive(Debug, Deserialize)]
pub struct Search {
	#[serde(default = "default_base_threshold")]
	pub base_threshold: f32,
	#[serde(default = "default_limit")]
	pub limit: u32,
	#[serde(default = "default_overfetch")]
	pub overfetch: u32,
	#[serde(default = "default_dedupe_prefix_len")]
	pub dedupe_prefix_len: usize,
	#[serde(default)]
	pub threshold: Threshold,
	#[serde(default)]
	pub expansion: Expansion,
	#[serde(default)]
	pub boost: Boost,
	#[serde(default)]
	pub diversity: Diversity,
	#[serde(default)]
	pub context: Context,
	#[serde(default)]
	pub budget: Budget,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			base_threshold: default_base_threshold(),
			limit: default_limit(),
			overfetch: default_overfetch(),
			dedupe_prefix_len: default_dedupe_prefix_len(),
			threshold: Threshold::default(),
			expansion: Expansion::default(),
			boost: Boost::default(),
			diversity: Diversity::default(),
			context: Context::default(),
			budget: Budget::default(),
		}
	}
}

/// Banded word-count adjustment plus per-signal deltas, clamped to
/// [floor, ceiling]. Heuristic, not a tuned model.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Threshold {
	pub short_max_words: u32,
	pub medium_max_words: u32,
	pub long_max_words: u32,
	pub short_delta: f32,
	pub medium_delta: f32,
	pub long_delta: f32,
	pub verbose_delta: f32,
	pub interrogative_delta: f32,
	pub quoted_delta: f32,
	pub floor: f32,
	pub ceiling: f32,
}
impl Default for Threshold {
	fn default() -> Self {
		Self {
			short_max_words: 2,
			medium_max_words: 4,
			long_max_words: 7,
			short_delta: -0.25,
			medium_delta: -0.2,
			long_delta: -0.1,
			verbose_delta: 0.05,
			interrogative_delta: -0.08,
			quoted_delta: -0.05,
			floor: 0.05,
			ceiling: 0.9,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Expansion {
	pub enabled: bool,
	pub max_variants: u32,
	pub keyword_min_words: u32,
	pub min_token_len: usize,
	pub min_top_score: f32,
}
impl Default for Expansion {
	fn default() -> Self {
		Self {
			enabled: true,
			max_variants: 3,
			keyword_min_words: 4,
			min_token_len: 3,
			min_top_score: 0.75,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Boost {
	pub min_keyword_len: usize,
	pub per_char: f32,
	pub per_keyword_cap: f32,
	pub early_window: usize,
	pub early_bonus: f32,
	pub max_total: f32,
	pub score_cap: f32,
}
impl Default for Boost {
	fn default() -> Self {
		Self {
			min_keyword_len: 2,
			per_char: 0.01,
			per_keyword_cap: 0.05,
			early_window: 100,
			early_bonus: 0.02,
			max_total: 0.2,
			score_cap: 0.99,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Diversity {
	pub enabled: bool,
}
impl Default for Diversity {
	fn default() -> Self {
		Self { enabled: true }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Context {
	pub high_confidence: f32,
	pub radius: u32,
	pub discount_per_step: f32,
	pub max_results: u32,
}
impl Default for Context {
	fn default() -> Self {
		Self { high_confidence: 0.45, radius: 1, discount_per_step: 0.1, max_results: 12 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Budget {
	pub max_passage_chars: usize,
	pub max_total_chars: usize,
	pub max_total_tokens: usize,
}
impl Default for Budget {
	fn default() -> Self {
		Self { max_passage_chars: 2_000, max_total_chars: 8_000, max_total_tokens: 2_000 }
	}
}

fn default_embed_batch_size() -> u32 {
	64
}

fn default_base_threshold() -> f32 {
	0.4
}

fn default_limit() -> u32 {
	6
}

fn default_overfetch() -> u32 {
	3
}

fn default_dedupe_prefix_len() -> usize {
	100
}
