use anyhow::{Context, Result, anyhow};
use colored::Colorize;
use serde::Deserialize;
use std::io::{BufRead, Lines, Write};

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    error: Option<StreamError>,
}

#[derive(Deserialize)]
struct StreamChoice {
    // Content-filter chunks from some compatible servers carry no delta.
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Deserialize, Default)]
struct StreamDelta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct StreamError {
    message: String,
}

enum Event {
    Fragment(String),
    Skip,
    Done,
}

/// Text fragments of a server-sent-events chat completion, in arrival order.
///
/// Ends at `data: [DONE]` or at the end of the body. The first error ends the
/// sequence as well; nothing is yielded after it.
pub struct Fragments<R> {
    lines: Lines<R>,
    finished: bool,
}

impl<R: BufRead> Fragments<R> {
    pub fn new(reader: R) -> Self {
        Fragments {
            lines: reader.lines(),
            finished: false,
        }
    }
}

impl<R: BufRead> Iterator for Fragments<R> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(
                        anyhow::Error::new(err).context("failed to read streaming response"),
                    ));
                }
                None => {
                    self.finished = true;
                    return None;
                }
            };

            match parse_line(&line) {
                Ok(Event::Fragment(text)) => return Some(Ok(text)),
                Ok(Event::Skip) => continue,
                Ok(Event::Done) => {
                    self.finished = true;
                    return None;
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

fn parse_line(line: &str) -> Result<Event> {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        // Blank separators, comments and `event:` lines carry no text.
        return Ok(Event::Skip);
    };

    let data = data.trim();
    if data == "[DONE]" {
        return Ok(Event::Done);
    }

    let chunk: StreamChunk =
        serde_json::from_str(data).context("failed to parse OpenAI streaming chunk")?;

    if let Some(err) = chunk.error {
        return Err(anyhow!("OpenAI stream error: {}", err.message));
    }

    match chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
        Some(text) if !text.is_empty() => Ok(Event::Fragment(text)),
        _ => Ok(Event::Skip),
    }
}

/// Consume a fragment sequence, echoing each piece to `out` before pulling the next.
///
/// Returns the whole text on a clean end. On error nothing is returned, but
/// whatever was already echoed stays on screen.
pub fn drain<I>(fragments: I, out: &mut dyn Write) -> Result<String>
where
    I: IntoIterator<Item = Result<String>>,
{
    let mut text = String::new();

    for fragment in fragments {
        let fragment = fragment?;
        write!(out, "{}", fragment.bright_green().bold())?;
        out.flush()?;
        text.push_str(&fragment);
    }

    writeln!(out)?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn body(lines: &[&str]) -> Cursor<Vec<u8>> {
        Cursor::new(lines.join("\n").into_bytes())
    }

    fn chunk(text: &str) -> String {
        format!(
            "data: {}",
            serde_json::json!({"choices": [{"delta": {"content": text}}]})
        )
    }

    #[test]
    fn yields_fragments_in_order_until_done() {
        let a = chunk("feat: ");
        let b = chunk("add foo");
        let after = chunk("ignored");
        let reader = body(&[
            ": keep-alive",
            r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#,
            &a,
            "",
            &b,
            "data: [DONE]",
            &after,
        ]);

        let got: Vec<String> = Fragments::new(reader).map(|f| f.unwrap()).collect();
        assert_eq!(got, vec!["feat: ", "add foo"]);
    }

    #[test]
    fn choices_without_delta_are_skipped() {
        let a = chunk("docs: ");
        let b = chunk("explain foo");
        let reader = body(&[
            r#"data: {"choices":[],"prompt_filter_results":[{"prompt_index":0}]}"#,
            &a,
            r#"data: {"choices":[{"index":0,"finish_reason":null,"content_filter_results":{}}]}"#,
            &b,
        ]);

        let got: Vec<String> = Fragments::new(reader).map(|f| f.unwrap()).collect();
        assert_eq!(got, vec!["docs: ", "explain foo"]);
    }

    #[test]
    fn end_of_body_without_done_is_a_clean_end() {
        let a = chunk("hello");
        let got: Vec<String> = Fragments::new(body(&[&a]))
            .map(|f| f.unwrap())
            .collect();
        assert_eq!(got, vec!["hello"]);
    }

    #[test]
    fn malformed_chunk_stops_the_sequence() {
        let a = chunk("partial");
        let b = chunk("never seen");
        let mut it = Fragments::new(body(&[&a, "data: {not json", &b]));

        assert_eq!(it.next().unwrap().unwrap(), "partial");
        assert!(it.next().unwrap().is_err());
        assert!(it.next().is_none());
    }

    #[test]
    fn error_payload_is_an_error() {
        let reader = body(&[r#"data: {"error":{"message":"rate limited"}}"#]);
        let err = Fragments::new(reader).next().unwrap().unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn drain_accumulates_and_echoes() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let fragments = vec![Ok("## Over".to_string()), Ok("view".to_string())];

        let text = drain(fragments, &mut out).unwrap();
        assert_eq!(text, "## Overview");
        assert_eq!(String::from_utf8(out).unwrap(), "## Overview\n");
    }

    #[test]
    fn drain_returns_no_partial_text_on_failure() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        let fragments = vec![
            Ok("shown".to_string()),
            Err(anyhow!("connection reset")),
            Ok("unreached".to_string()),
        ];

        let err = drain(fragments, &mut out).unwrap_err();
        assert!(err.to_string().contains("connection reset"));
        assert_eq!(String::from_utf8(out).unwrap(), "shown");
    }
}
