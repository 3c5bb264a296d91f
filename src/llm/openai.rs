use super::LlmClient;
use super::prompt_builder::{self, PromptPair};
use super::stream::{Fragments, drain};
use crate::config::Settings;
use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const TITLE_MAX_TOKENS: u32 = 60;
const DESCRIPTION_MAX_TOKENS: u32 = 800;

/// Minimal request/response structs for OpenAI Chat Completions API.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// OpenAI-based implementation of LlmClient.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base_url: String,
    stream: bool,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String, api_base_url: &str, stream: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("failed to build HTTP client")?;

        Ok(OpenAiClient {
            client,
            api_key,
            model,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            stream,
        })
    }

    fn chat_url(&self) -> String {
        chat_url(&self.api_base_url)
    }

    fn request(&self, prompts: PromptPair, max_tokens: u32) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts.system,
                },
                ChatMessage {
                    role: "user",
                    content: prompts.user,
                },
            ],
            max_tokens,
            stream: self.stream,
        }
    }

    fn send(&self, req: &ChatRequest) -> Result<Response> {
        let resp = self
            .client
            .post(self.chat_url())
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .context("failed to send request to OpenAI")?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().unwrap_or_default();
            return Err(anyhow!(
                "OpenAI API error: HTTP {} - {}",
                status.as_u16(),
                text.trim()
            ));
        }

        Ok(resp)
    }

    fn call_chat(&self, req: &ChatRequest, out: &mut dyn Write) -> Result<String> {
        if req.stream {
            return self.call_chat_streaming(req, out);
        }

        log::info!("Calling OpenAI model {:?}", &req.model);

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Waiting for the model...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let result = self.send(req).and_then(|resp| {
            resp.json::<ChatResponse>()
                .context("failed to parse OpenAI response")
        });
        spinner.finish_and_clear();

        let content = extract_content(result?)?;
        writeln!(out, "{}", content.bright_green().bold())?;
        Ok(content)
    }

    fn call_chat_streaming(&self, req: &ChatRequest, out: &mut dyn Write) -> Result<String> {
        log::info!("Streaming OpenAI model {:?}", &req.model);

        let resp = self.send(req)?;
        drain(Fragments::new(BufReader::new(resp)), out)
    }
}

fn chat_url(base: &str) -> String {
    if base.ends_with("/v1") {
        format!("{base}/chat/completions")
    } else {
        format!("{base}/v1/chat/completions")
    }
}

fn extract_content(resp: ChatResponse) -> Result<String> {
    if let Some(usage) = &resp.usage {
        log::debug!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }

    resp.choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default())
        .ok_or_else(|| anyhow!("no choices returned from OpenAI"))
}

impl LlmClient for OpenAiClient {
    fn generate_title(
        &self,
        diff: &str,
        settings: &Settings,
        out: &mut dyn Write,
    ) -> Result<String> {
        let prompts = prompt_builder::title_prompt(diff, &settings.language);

        log::trace!("PR title prompt:\n{}", truncate(&prompts.user, 3000));

        let req = self.request(prompts, TITLE_MAX_TOKENS);
        let title = self.call_chat(&req, out)?;
        Ok(title.trim().to_string())
    }

    fn generate_description(
        &self,
        diff: &str,
        template: &str,
        settings: &Settings,
        out: &mut dyn Write,
    ) -> Result<String> {
        let prompts = prompt_builder::description_prompt(diff, template, &settings.language);

        log::trace!("PR description prompt:\n{}", truncate(&prompts.user, 3500));

        let req = self.request(prompts, DESCRIPTION_MAX_TOKENS);
        self.call_chat(&req, out)
    }
}

/// Truncate long strings for debug logging.
fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }

    let mut end = max_len;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...\n[truncated {} chars]", &s[..end], s.len() - end)
}
