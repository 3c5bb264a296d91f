use crate::error::PraiError;
use crate::git::run;
use crate::review::Draft;
use anyhow::{Context, Result};
use serde::Deserialize;

/// `gh pr list` exits with this status when no pull request matches.
const NO_RESULTS_EXIT_CODE: i32 = 1;

/// An open pull request, as reported by `gh pr list`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestRef {
    pub number: u64,
    pub title: String,
}

/// The hosting side of the workflow: pull request lookup and submission.
pub trait PrHost {
    /// The open pull request from `head` into `base`, if there is one.
    fn find_open(&self, base: &str, head: &str) -> Result<Option<PullRequestRef>>;

    /// Web URL of a pull request, or an empty string if it cannot be resolved.
    fn url_of(&self, number: u64) -> String;

    fn create(&self, draft: &Draft, base: &str, head: &str) -> Result<()>;

    fn update(&self, number: u64, draft: &Draft) -> Result<()>;
}

/// Interpret the result of `gh pr list --json number,title`.
///
/// The "no results" exit status and an empty list both mean absence. With
/// several matches the first one wins.
pub fn parse_pr_list(
    code: Option<i32>,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<Option<PullRequestRef>> {
    match code {
        Some(0) => {}
        Some(NO_RESULTS_EXIT_CODE) => return Ok(None),
        other => {
            return Err(PraiError::command_failed("gh", &["pr", "list"], other, stderr).into());
        }
    }

    let prs: Vec<PullRequestRef> =
        serde_json::from_slice(stdout).context("error parsing PR data from gh")?;
    Ok(prs.into_iter().next())
}

/// Interpret the result of `gh pr view --json url`.
///
/// Any failure, including death by signal, yields an empty URL.
pub fn interpret_url(code: Option<i32>, stdout: &[u8]) -> String {
    match code {
        Some(0) => String::from_utf8_lossy(stdout).trim().to_string(),
        _ => String::new(),
    }
}

fn pr_list_args<'a>(base: &'a str, head: &'a str) -> Vec<&'a str> {
    vec![
        "pr", "list", "--state", "open", "--json", "number,title", "-B", base, "-H", head,
    ]
}

fn pr_view_args(number: &str) -> Vec<&str> {
    vec!["pr", "view", number, "--json", "url", "--jq", ".url"]
}

fn pr_create_args<'a>(draft: &'a Draft, base: &'a str, head: &'a str) -> Vec<&'a str> {
    vec![
        "pr",
        "create",
        "--title",
        &draft.title,
        "--body",
        &draft.description,
        "--base",
        base,
        "--head",
        head,
    ]
}

fn pr_edit_args<'a>(number: &'a str, draft: &'a Draft) -> Vec<&'a str> {
    vec![
        "pr",
        "edit",
        number,
        "--title",
        &draft.title,
        "--body",
        &draft.description,
    ]
}

/// The GitHub CLI on the PATH.
#[derive(Debug, Default, Clone, Copy)]
pub struct GhCli;

impl GhCli {
    fn run_checked(&self, args: &[&str], label: &[&str]) -> Result<String> {
        let output = run("gh", args)?;
        if !output.status.success() {
            // Labels keep PR bodies out of error messages.
            let err = PraiError::command_failed("gh", label, output.status.code(), &output.stderr);
            return Err(err.into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl PrHost for GhCli {
    fn find_open(&self, base: &str, head: &str) -> Result<Option<PullRequestRef>> {
        let output = run("gh", &pr_list_args(base, head))?;
        parse_pr_list(output.status.code(), &output.stdout, &output.stderr)
    }

    fn url_of(&self, number: u64) -> String {
        let number = number.to_string();
        match run("gh", &pr_view_args(&number)) {
            Ok(output) => {
                let url = interpret_url(output.status.code(), &output.stdout);
                if url.is_empty() {
                    log::debug!(
                        "Could not resolve URL of PR #{number}: {}",
                        String::from_utf8_lossy(&output.stderr).trim()
                    );
                }
                url
            }
            Err(err) => {
                log::debug!("Could not resolve URL of PR #{number}: {err:#}");
                String::new()
            }
        }
    }

    fn create(&self, draft: &Draft, base: &str, head: &str) -> Result<()> {
        log::debug!(
            "Creating PR {head} -> {base}, title {:?}, body {} chars",
            draft.title,
            draft.description.len()
        );

        let url = self.run_checked(
            &pr_create_args(draft, base, head),
            &["pr", "create", "--base", base, "--head", head],
        )?;
        log::info!("gh pr create reported {url}");
        Ok(())
    }

    fn update(&self, number: u64, draft: &Draft) -> Result<()> {
        let number = number.to_string();
        log::debug!("Updating PR #{number}, title {:?}", draft.title);

        self.run_checked(&pr_edit_args(&number, draft), &["pr", "edit", &number])?;
        Ok(())
    }
}
