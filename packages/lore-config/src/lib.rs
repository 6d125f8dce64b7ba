mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Boost, Budget, Chunking, Config, Context, Diversity, EmbeddingProviderConfig, Expansion,
	ExtractionProviderConfig, Ingest, Postgres, Providers, Search, Service, Storage, Threshold,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.batch_size == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.providers.extraction.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.extraction.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.chunking.max_tokens == 0 {
		return Err(Error::Validation {
			message: "chunking.max_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.overlap_tokens >= cfg.chunking.max_tokens {
		return Err(Error::Validation {
			message: "chunking.overlap_tokens must be less than chunking.max_tokens.".to_string(),
		});
	}
	if cfg.ingest.max_document_bytes == 0 {
		return Err(Error::Validation {
			message: "ingest.max_document_bytes must be greater than zero.".to_string(),
		});
	}
	if cfg.search.limit == 0 {
		return Err(Error::Validation {
			message: "search.limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.overfetch == 0 {
		return Err(Error::Validation {
			message: "search.overfetch must be greater than zero.".to_string(),
		});
	}
	if cfg.search.dedupe_prefix_len == 0 {
		return Err(Error::Validation {
			message: "search.dedupe_prefix_len must be greater than zero.".to_string(),
		});
	}

	validate_threshold(&cfg.search.threshold, cfg.search.base_threshold)?;

	if cfg.search.expansion.max_variants == 0 || cfg.search.expansion.max_variants > 3 {
		return Err(Error::Validation {
			message: "search.expansion.max_variants must be between 1 and 3.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.search.expansion.min_top_score) {
		return Err(Error::Validation {
			message: "search.expansion.min_top_score must be in the range 0.0-1.0.".to_string(),
		});
	}

	for (path, value) in [
		("search.boost.per_char", cfg.search.boost.per_char),
		("search.boost.per_keyword_cap", cfg.search.boost.per_keyword_cap),
		("search.boost.early_bonus", cfg.search.boost.early_bonus),
		("search.boost.max_total", cfg.search.boost.max_total),
	] {
		if !value.is_finite() || value < 0.0 {
			return Err(Error::Validation {
				message: format!("{path} must be a finite number, zero or greater."),
			});
		}
	}

	if !(0.0..=1.0).contains(&cfg.search.boost.score_cap) {
		return Err(Error::Validation {
			message: "search.boost.score_cap must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.search.context.high_confidence) {
		return Err(Error::Validation {
			message: "search.context.high_confidence must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.search.context.radius == 0 || cfg.search.context.radius > 2 {
		return Err(Error::Validation {
			message: "search.context.radius must be 1 or 2.".to_string(),
		});
	}
	if !cfg.search.context.discount_per_step.is_finite()
		|| cfg.search.context.discount_per_step <= 0.0
	{
		return Err(Error::Validation {
			message: "search.context.discount_per_step must be greater than zero.".to_string(),
		});
	}
	if cfg.search.context.max_results <= cfg.search.limit {
		return Err(Error::Validation {
			message: "search.context.max_results must be greater than search.limit.".to_string(),
		});
	}
	if cfg.search.budget.max_passage_chars == 0
		|| cfg.search.budget.max_total_chars == 0
		|| cfg.search.budget.max_total_tokens == 0
	{
		return Err(Error::Validation {
			message: "search.budget limits must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_threshold(threshold: &Threshold, base: f32) -> Result<()> {
	if !base.is_finite() || !(0.0..=1.0).contains(&base) {
		return Err(Error::Validation {
			message: "search.base_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&threshold.floor) || !(0.0..=1.0).contains(&threshold.ceiling) {
		return Err(Error::Validation {
			message: "search.threshold floor and ceiling must be in the range 0.0-1.0.".to_string(),
		});
	}
	if threshold.floor > threshold.ceiling {
		return Err(Error::Validation {
			message: "search.threshold.floor must not exceed search.threshold.ceiling.".to_string(),
		});
	}
	if threshold.short_max_words >= threshold.medium_max_words
		|| threshold.medium_max_words >= threshold.long_max_words
	{
		return Err(Error::Validation {
			message: "search.threshold word-count bands must be strictly increasing.".to_string(),
		});
	}

	for (path, value) in [
		("search.threshold.short_delta", threshold.short_delta),
		("search.threshold.medium_delta", threshold.medium_delta),
		("search.threshold.long_delta", threshold.long_delta),
		("search.threshold.verbose_delta", threshold.verbose_delta),
		("search.threshold.interrogative_delta", threshold.interrogative_delta),
		("search.threshold.quoted_delta", threshold.quoted_delta),
	] {
		if !value.is_finite() {
			return Err(Error::Validation { message: format!("{path} must be a finite number.") });
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.chunking.tokenizer_repo.as_deref().map(|repo| repo.trim().is_empty()).unwrap_or(false) {
		cfg.chunking.tokenizer_repo = None;
	}
}
