use crate::llm::openai::{DEFAULT_API_BASE, DEFAULT_MODEL};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "prai",
    version,
    about = "Create or update a Pull Request with an AI-generated title and description",
    after_help = "If no command is specified, 'prai' defaults to the 'create' command."
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file to use instead of ~/.config/prai/config.json
    #[arg(long, env = "PRAI_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// API key; overrides the stored api_key setting
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Model name passed to the chat completions API
    #[arg(long, env = "PRAI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "PRAI_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    pub api_base: String,

    /// Wait for complete responses instead of streaming tokens as they arrive
    #[arg(long, global = true)]
    pub no_stream: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands, e.g. `prai create --base develop`
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or update a Pull Request with AI-generated title and description
    Create(CreateArgs),

    /// Configure settings (api_key, language, template, prompt)
    Config(ConfigArgs),
}

#[derive(Args, Debug, Default)]
pub struct CreateArgs {
    /// Base branch for the PR; defaults to the repository's default branch
    #[arg(long)]
    pub base: Option<String>,
}

/// `prai config show`, `prai config reset`, or `prai config <key> <value>`
///
/// Once any argument follows `config`, the next word is read as a key, so a
/// flag between `config` and `show` turns `show` into a key missing its value.
#[derive(Args, Debug)]
#[command(
    args_conflicts_with_subcommands = true,
    subcommand_required = false,
    after_help = "Available keys:\n  \
        api_key    The OpenAI API key\n  \
        language   Language of the generated title and description (e.g. 'en', 'ja')\n  \
        template   'default' or a path to a PR template (e.g. './.github/pull_request_template.md')\n  \
        prompt     Custom prompt text\n\n\
        Flags such as -v go before 'config' or after the action: 'prai -v config show'."
)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,

    /// Setting to change
    #[arg(requires = "value")]
    pub key: Option<String>,

    /// New value for the setting
    pub value: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the current configuration settings
    Show,

    /// Reset the configuration settings to default values
    Reset,
}
