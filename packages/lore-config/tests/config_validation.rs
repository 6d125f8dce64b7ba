use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml() -> String {
	SAMPLE_CONFIG_TEMPLATE_TOML.to_string()
}

fn sample_toml_with<F>(mutate: F) -> String
where
	F: FnOnce(&mut toml::Table),
{
	let mut value: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let root = value.as_table_mut().expect("Template config must be a table.");

	mutate(root);

	toml::to_string(&value).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("lore_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_expecting_error(payload: String, needle: &str) {
	let path = write_temp_config(payload);
	let result = lore_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected a validation error.");
	let message = err.to_string();

	assert!(message.contains(needle), "Unexpected error message: {message}");
}

#[test]
fn sample_config_loads_with_defaults() {
	let path = write_temp_config(sample_toml());
	let result = lore_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Sample config must load.");

	assert_eq!(cfg.search.limit, 6);
	assert_eq!(cfg.search.threshold.floor, 0.05);
	assert_eq!(cfg.search.context.max_results, 12);
	assert_eq!(cfg.search.budget.max_passage_chars, 2_000);
	assert!(cfg.search.expansion.enabled);
}

#[test]
fn zero_embedding_dimensions_is_rejected() {
	let payload = sample_toml_with(|root| {
		let embedding = root
			.get_mut("providers")
			.and_then(Value::as_table_mut)
			.and_then(|providers| providers.get_mut("embedding"))
			.and_then(Value::as_table_mut)
			.expect("Template config must include [providers.embedding].");

		embedding.insert("dimensions".to_string(), Value::Integer(0));
	});

	load_expecting_error(payload, "providers.embedding.dimensions must be greater than zero.");
}

#[test]
fn overlap_must_be_less_than_max_tokens() {
	let payload = sample_toml_with(|root| {
		let chunking = root
			.get_mut("chunking")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [chunking].");

		chunking.insert("overlap_tokens".to_string(), Value::Integer(500));
	});

	load_expecting_error(payload, "chunking.overlap_tokens must be less than chunking.max_tokens.");
}

#[test]
fn threshold_floor_must_not_exceed_ceiling() {
	let payload = sample_toml_with(|root| {
		let search = root
			.get_mut("search")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [search].");
		let mut threshold = toml::Table::new();

		threshold.insert("floor".to_string(), Value::Float(0.8));
		threshold.insert("ceiling".to_string(), Value::Float(0.2));
		search.insert("threshold".to_string(), Value::Table(threshold));
	});

	load_expecting_error(payload, "search.threshold.floor must not exceed search.threshold.ceiling.");
}

#[test]
fn context_cap_must_exceed_limit() {
	let payload = sample_toml_with(|root| {
		let search = root
			.get_mut("search")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [search].");
		let mut context = toml::Table::new();

		context.insert("max_results".to_string(), Value::Integer(6));
		search.insert("context".to_string(), Value::Table(context));
	});

	load_expecting_error(payload, "search.context.max_results must be greater than search.limit.");
}

#[test]
fn expansion_variant_cap_is_bounded() {
	let payload = sample_toml_with(|root| {
		let search = root
			.get_mut("search")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [search].");
		let mut expansion = toml::Table::new();

		expansion.insert("max_variants".to_string(), Value::Integer(5));
		search.insert("expansion".to_string(), Value::Table(expansion));
	});

	load_expecting_error(payload, "search.expansion.max_variants must be between 1 and 3.");
}

#[test]
fn blank_tokenizer_repo_normalizes_to_none() {
	let payload = sample_toml_with(|root| {
		let chunking = root
			.get_mut("chunking")
			.and_then(Value::as_table_mut)
			.expect("Template config must include [chunking].");

		chunking.insert("tokenizer_repo".to_string(), Value::String("   ".to_string()));
	});
	let path = write_temp_config(payload);
	let result = lore_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Config with blank tokenizer_repo must load.");

	assert!(cfg.chunking.tokenizer_repo.is_none());
}
