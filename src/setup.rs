use crate::cli_args::Cli;
use crate::config::{ConfigStore, Settings};
use crate::error::PraiError;
use crate::llm::LlmClient;
use crate::llm::openai::OpenAiClient;
use anyhow::Result;

/// Open the settings file selected by `--config` / `PRAI_CONFIG`, or the default one.
pub fn config_store(cli: &Cli) -> Result<ConfigStore> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => ConfigStore::default_path()?,
    };
    Ok(ConfigStore::new(path))
}

/// Stored settings with CLI / environment overrides applied.
///
/// Precedence:
///   1. `--api-key` flag or `OPENAI_API_KEY`
///   2. `api_key` in the settings file
pub fn resolve_settings(cli: &Cli, store: &ConfigStore) -> Settings {
    let mut settings = store.load();
    if let Some(key) = cli.api_key.as_deref().filter(|k| !k.is_empty()) {
        settings.api_key = key.to_string();
    }
    settings
}

/// Build the LLM client based on CLI + settings.
pub fn build_llm_client(cli: &Cli, settings: &Settings) -> Result<Box<dyn LlmClient>> {
    if settings.api_key.is_empty() {
        return Err(PraiError::MissingApiKey.into());
    }

    log::debug!(
        "Using OpenAiClient with model {} at {} (stream: {})",
        cli.model,
        cli.api_base,
        !cli.no_stream
    );

    let client = OpenAiClient::new(
        settings.api_key.clone(),
        cli.model.clone(),
        &cli.api_base,
        !cli.no_stream,
    )?;
    Ok(Box::new(client))
}
