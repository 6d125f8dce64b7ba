use lore_config::Threshold;
use lore_domain::QueryShape;

/// Adjusts the caller's base threshold by query shape. Short queries carry
/// little signal, so the net widens; verbose queries are assumed already
/// selective and tighten it slightly. Interrogative and quoted queries widen
/// it further (quote-literal matching is not implemented, so broadening
/// compensates). The result is clamped to [floor, ceiling].
pub fn resolve_threshold(shape: &QueryShape, base: f32, cfg: &Threshold) -> f32 {
	let word_count = shape.word_count as u32;
	let band_delta = if word_count <= cfg.short_max_words {
		cfg.short_delta
	} else if word_count <= cfg.medium_max_words {
		cfg.medium_delta
	} else if word_count <= cfg.long_max_words {
		cfg.long_delta
	} else {
		cfg.verbose_delta
	};
	let mut threshold = base + band_delta;

	if shape.interrogative {
		threshold += cfg.interrogative_delta;
	}
	if shape.quoted {
		threshold += cfg.quoted_delta;
	}

	threshold.clamp(cfg.floor, cfg.ceiling)
}
