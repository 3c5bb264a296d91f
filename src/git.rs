use crate::error::PraiError;
use anyhow::{Context, Result, bail};
use std::process::{Command, Output};

/// Paths left out of the diff sent to the model: dependency lock files.
pub const DIFF_EXCLUDES: &[&str] = &[
    "package-lock.json",
    "pnpm-lock.yaml",
    "composer.lock",
    "*.lock",
    "go.sum",
    "go.mod",
];

/// Repository state the create workflow reads.
pub trait Vcs {
    /// Name of the checked-out branch.
    fn current_branch(&self) -> Result<String>;

    /// The hosting remote's default branch, used when no base is given.
    fn default_branch(&self) -> Result<String>;

    /// The patch between `origin/<base>` and `head`, minus [`DIFF_EXCLUDES`].
    fn diff(&self, base: &str, head: &str) -> Result<String>;
}

/// Run an external program and capture its output, whatever the exit status.
pub fn run(program: &str, args: &[&str]) -> Result<Output> {
    log::debug!("Running {program} {}", args.join(" "));

    Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("failed to run {program} {}", args.join(" ")))
}

/// Run a git command and capture stdout as String.
pub fn git_output(args: &[&str]) -> Result<String> {
    let output = run("git", args)?;

    if !output.status.success() {
        let err = PraiError::command_failed("git", args, output.status.code(), &output.stderr);
        return Err(err.into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Range expression comparing the remote base with the local head.
pub fn diff_range(base: &str, head: &str) -> String {
    format!("origin/{base}...{head}")
}

fn diff_args(range: &str) -> Vec<String> {
    let mut args = vec!["diff".to_string(), range.to_string(), "--".to_string()];
    args.extend(DIFF_EXCLUDES.iter().map(|pattern| format!(":!{pattern}")));
    args
}

/// `git` on the PATH, plus `gh` for the default-branch query.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitCli;

impl Vcs for GitCli {
    fn current_branch(&self) -> Result<String> {
        let name = git_output(&["rev-parse", "--abbrev-ref", "HEAD"])
            .context("not inside a git repository")?
            .trim()
            .to_string();

        if name == "HEAD" {
            bail!("HEAD is detached; check out a branch before creating a PR");
        }
        Ok(name)
    }

    fn default_branch(&self) -> Result<String> {
        match gh_default_branch() {
            Ok(name) => return Ok(name),
            Err(err) => {
                log::info!("gh could not report the default branch ({err:#}); asking git")
            }
        }

        let name = git_output(&["symbolic-ref", "--short", "refs/remotes/origin/HEAD"])
            .context("failed to determine the default branch; pass --base")?;
        Ok(name.trim().trim_start_matches("origin/").to_string())
    }

    fn diff(&self, base: &str, head: &str) -> Result<String> {
        let args = diff_args(&diff_range(base, head));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        git_output(&args)
    }
}

fn gh_default_branch() -> Result<String> {
    let args = [
        "repo",
        "view",
        "--json",
        "defaultBranchRef",
        "--jq",
        ".defaultBranchRef.name",
    ];
    let output = run("gh", &args)?;
    if !output.status.success() {
        let err = PraiError::command_failed("gh", &args, output.status.code(), &output.stderr);
        return Err(err.into());
    }

    let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if name.is_empty() || name == "null" {
        bail!("gh returned an empty default branch name");
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_compares_remote_base_with_head() {
        assert_eq!(diff_range("main", "feature-x"), "origin/main...feature-x");
    }

    #[test]
    fn diff_excludes_lock_files() {
        let args = diff_args("origin/main...feature-x");
        assert_eq!(&args[..3], ["diff", "origin/main...feature-x", "--"]);
        assert!(args.contains(&":!*.lock".to_string()));
        assert!(args.contains(&":!package-lock.json".to_string()));
        assert!(args.contains(&":!go.sum".to_string()));
        assert_eq!(args.len(), 3 + DIFF_EXCLUDES.len());
    }

    #[test]
    fn failed_command_reports_program_and_status() {
        let err = git_output(&["definitely-not-a-git-subcommand"]).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("git") && msg.contains("definitely-not-a-git-subcommand"));
    }
}
