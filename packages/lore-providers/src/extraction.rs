use std::time::Duration;

use color_eyre::{Result, eyre};
use lore_domain::DocumentKind;
use reqwest::Client;
use serde_json::Value;

/// Sends raw document bytes to the extraction service, which turns binary
/// formats (pdf, docx, epub) into plain text. The format travels as a query
/// parameter; the payload is the untouched byte stream.
pub async fn extract(
	cfg: &lore_config::ExtractionProviderConfig,
	data: &[u8],
	kind: DocumentKind,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.query(&[("format", kind.as_str())])
		.header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
		.body(data.to_vec())
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;

	parse_extraction_response(json)
}

fn parse_extraction_response(json: Value) -> Result<String> {
	let text = json
		.get("text")
		.and_then(|v| v.as_str())
		.ok_or_else(|| eyre::eyre!("Extraction response is missing text field."))?;

	Ok(text.to_string())
}
