use anyhow::{Context, Result, bail};
use colored::Colorize;
use std::env;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;
use std::process::Command;

/// Editor used when `$EDITOR` is unset.
const FALLBACK_EDITOR: &str = "vi";

/// A generated pull request, as the user will submit it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
}

impl Field {
    fn as_str(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Description => "description",
        }
    }
}

/// Where the review of a draft stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Proposed,
    Editing(Field),
    Accepted,
}

/// Opens text for manual revision and returns the result.
pub trait TextEditor {
    fn edit(&self, text: &str) -> Result<String>;
}

/// `$EDITOR` (or `vi`) on a scratch file.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn from_env() -> Self {
        let command = env::var("EDITOR")
            .ok()
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_EDITOR.to_string());
        ExternalEditor { command }
    }
}

/// Split an editor setting like `code --wait` into program and arguments.
///
/// A setting that names an existing file is taken whole, so paths with spaces
/// work unquoted. Quoting is not interpreted.
fn parse_editor_command(editor: &str) -> (&str, Vec<&str>) {
    let editor = editor.trim();
    if Path::new(editor).is_file() {
        return (editor, Vec::new());
    }

    let mut parts = editor.split_whitespace();
    let cmd = parts.next().unwrap_or(editor);
    (cmd, parts.collect())
}

impl TextEditor for ExternalEditor {
    fn edit(&self, text: &str) -> Result<String> {
        let mut scratch = tempfile::Builder::new()
            .prefix("pr-edit-")
            .suffix(".md")
            .tempfile()
            .context("failed to create temp file")?;
        scratch
            .write_all(text.as_bytes())
            .context("failed to write to temp file")?;
        scratch.flush().context("failed to write to temp file")?;

        let (program, args) = parse_editor_command(&self.command);
        log::debug!("Opening {} in {}", scratch.path().display(), self.command);

        let status = Command::new(program)
            .args(args)
            .arg(scratch.path())
            .status()
            .with_context(|| format!("failed to run editor '{}'", self.command))?;

        if !status.success() {
            bail!("editor '{}' exited with status {:?}", self.command, status.code());
        }

        fs::read_to_string(scratch.path()).context("failed to read edited file")
    }
}

/// Line-based yes/no prompts over any reader and writer.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Terminal { input, output }
    }

    pub fn out(&mut self) -> &mut W {
        &mut self.output
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Ask a `([y]/n)` question. Empty input means yes; only `n`/`no` means no.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut buf = String::new();
        let read = self.input.read_line(&mut buf)?;
        if read == 0 {
            bail!("input closed before an answer was given");
        }

        let answer = buf.trim().to_lowercase();
        Ok(answer != "n" && answer != "no")
    }

    pub fn show_draft(&mut self, draft: &Draft) -> Result<()> {
        writeln!(self.output, "🤖 Title")?;
        writeln!(self.output, "{}", draft.title.bright_green().bold())?;
        writeln!(self.output, "🤖 Description")?;
        writeln!(self.output, "{}", draft.description.bright_green().bold())?;
        Ok(())
    }
}

/// Run the confirm/edit loop until the user accepts the draft.
///
/// There is no limit on rounds; only the user's answers end the loop.
pub fn review<R, W>(
    mut draft: Draft,
    question: &str,
    term: &mut Terminal<R, W>,
    editor: &dyn TextEditor,
) -> Result<Draft>
where
    R: BufRead,
    W: Write,
{
    let mut state = ReviewState::Proposed;

    loop {
        state = match state {
            ReviewState::Proposed => {
                if term.confirm(question)? {
                    ReviewState::Accepted
                } else {
                    ReviewState::Editing(Field::Title)
                }
            }
            ReviewState::Editing(field) => {
                edit_field(&mut draft, field, term, editor)?;
                match field {
                    Field::Title => ReviewState::Editing(Field::Description),
                    Field::Description => {
                        term.show_draft(&draft)?;
                        ReviewState::Proposed
                    }
                }
            }
            ReviewState::Accepted => return Ok(draft),
        };
    }
}

fn edit_field<R, W>(
    draft: &mut Draft,
    field: Field,
    term: &mut Terminal<R, W>,
    editor: &dyn TextEditor,
) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    loop {
        let question = format!("Do you want to edit the {}? ([y]/n): ", field.as_str());
        if !term.confirm(&question)? {
            return Ok(());
        }

        let current = match field {
            Field::Title => &draft.title,
            Field::Description => &draft.description,
        };

        match editor.edit(current) {
            Ok(edited) => {
                match field {
                    Field::Title => draft.title = edited.trim().to_string(),
                    Field::Description => draft.description = edited,
                }
                return Ok(());
            }
            Err(err) => {
                writeln!(
                    term.out(),
                    "{}",
                    format!("Error editing {}: {err:#}", field.as_str()).bright_red().bold()
                )?;
            }
        }
    }
}
