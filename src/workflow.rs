use crate::config::Settings;
use crate::error::PraiError;
use crate::gh::{PrHost, PullRequestRef};
use crate::git::{Vcs, diff_range};
use crate::llm::LlmClient;
use crate::review::{Draft, Terminal, TextEditor, review};
use crate::template;
use anyhow::{Context, Result};
use colored::Colorize;
use std::io::{BufRead, Write};

/// Inputs of one `prai create` run.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    /// Branch the PR targets; the remote's default branch when `None`.
    pub base: Option<String>,
}

/// The external collaborators the workflow drives.
pub struct Collaborators<'a> {
    pub vcs: &'a dyn Vcs,
    pub host: &'a dyn PrHost,
    pub llm: &'a dyn LlmClient,
    pub editor: &'a dyn TextEditor,
}

/// How a create run ended. Every variant is a successful exit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    NoChanges,
    Cancelled,
    Created(Option<PullRequestRef>),
    Updated(PullRequestRef),
}

/// Draft a PR for the current branch, let the user review it, and submit it.
pub fn run_create<R, W>(
    opts: &CreateOptions,
    settings: &Settings,
    deps: &Collaborators<'_>,
    term: &mut Terminal<R, W>,
) -> Result<Outcome>
where
    R: BufRead,
    W: Write,
{
    if settings.api_key.is_empty() {
        return Err(PraiError::MissingApiKey.into());
    }

    let head = deps.vcs.current_branch()?;
    let base = match &opts.base {
        Some(base) => base.clone(),
        None => deps
            .vcs
            .default_branch()
            .context("Error getting default branch")?,
    };
    log::info!("Preparing PR {head} -> {base}");

    let diff = deps
        .vcs
        .diff(&base, &head)
        .context("Error getting PR diff")?;
    if diff.trim().is_empty() {
        writeln!(
            term.out(),
            "{}: No changes to create a PR for.",
            diff_range(&base, &head)
        )?;
        return Ok(Outcome::NoChanges);
    }

    let existing = deps
        .host
        .find_open(&base, &head)
        .context("Error checking for existing PR")?;

    if let Some(pr) = &existing {
        writeln!(term.out(), "An existing PR (#{}) was found:\n", pr.number)?;
        print_pr_banner(term.out(), &pr.title, pr.number, &deps.host.url_of(pr.number))?;
        if !term.confirm("\nDo you want to update this PR? ([y]/n): ")? {
            writeln!(term.out(), "Operation cancelled.")?;
            return Ok(Outcome::Cancelled);
        }
    }

    writeln!(term.out(), "\n🤖 Title")?;
    let title = deps
        .llm
        .generate_title(&diff, settings, term.out())
        .context("Error generating PR title")?;

    writeln!(term.out(), "\n🤖 Description")?;
    let template = template::resolve(&settings.template);
    let description = deps
        .llm
        .generate_description(&diff, &template, settings, term.out())
        .context("Error generating PR description")?;

    let question = match &existing {
        Some(pr) => format!(
            "\nDo you want to update the existing PR (#{}) with this title and description? ([y]/n): ",
            pr.number
        ),
        None => "\nDo you want to create a PR with this title and description? ([y]/n): ".to_string(),
    };
    let draft = review(Draft { title, description }, &question, term, deps.editor)?;

    match existing {
        Some(pr) => {
            deps.host
                .update(pr.number, &draft)
                .context("Error updating PR")?;

            print_pr_banner(term.out(), &draft.title, pr.number, &deps.host.url_of(pr.number))?;
            writeln!(term.out(), "Pull Request updated successfully!")?;
            Ok(Outcome::Updated(PullRequestRef {
                number: pr.number,
                title: draft.title,
            }))
        }
        None => {
            deps.host
                .create(&draft, &base, &head)
                .context("Error creating PR")?;

            // `gh pr create` only prints a URL, so look the new PR up by branch pair.
            let created = deps
                .host
                .find_open(&base, &head)
                .context("Error checking for created PR")?;

            match &created {
                Some(pr) => {
                    print_pr_banner(term.out(), &draft.title, pr.number, &deps.host.url_of(pr.number))?;
                }
                None => {
                    log::warn!("PR was created but is not listed yet for {head} -> {base}");
                    writeln!(term.out(), "\n\n{}\n", draft.title.bright_green().bold())?;
                }
            }
            writeln!(term.out(), "Pull Request created successfully!")?;
            Ok(Outcome::Created(created))
        }
    }
}

fn print_pr_banner(out: &mut dyn Write, title: &str, number: u64, url: &str) -> Result<()> {
    writeln!(out, "{}", format!("{title} #{number}").bright_green().bold())?;
    writeln!(out, "{}\n", url.bright_green().bold())?;
    Ok(())
}
