pub mod openai;
mod prompt_builder;
pub mod prompts;
mod stream;

use crate::config::Settings;
use anyhow::Result;
use std::io::Write;

/// Trait for talking to an LLM.
///
/// When a client streams, fragments are written to `out` as they arrive; the
/// returned string is always the complete text.
pub trait LlmClient {
    /// Generate a pull request title for the diff.
    fn generate_title(
        &self,
        diff: &str,
        settings: &Settings,
        out: &mut dyn Write,
    ) -> Result<String>;

    /// Generate a pull request description for the diff, shaped by `template`.
    fn generate_description(
        &self,
        diff: &str,
        template: &str,
        settings: &Settings,
        out: &mut dyn Write,
    ) -> Result<String>;
}
