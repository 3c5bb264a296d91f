mod cli_args;
mod config;
mod error;
mod gh;
mod git;
mod llm;
mod logging;
mod review;
mod setup;
mod template;
mod workflow;

use anyhow::{Result, bail};
use clap::{CommandFactory, Parser};
use cli_args::{Cli, Command, ConfigAction, ConfigArgs, CreateArgs};
use colored::Colorize;
use config::{ConfigStore, SettingKey, mask_secret};
use gh::GhCli;
use git::GitCli;
use review::{ExternalEditor, Terminal};
use std::io;
use std::process::ExitCode;
use workflow::{Collaborators, CreateOptions, Outcome};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and succeed; usage errors exit 1.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    logging::init_logger(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".bright_red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let store = setup::config_store(cli)?;

    match &cli.command {
        None => run_create(cli, &store, &CreateArgs::default()),
        Some(Command::Create(args)) => run_create(cli, &store, args),
        Some(Command::Config(args)) => run_config(&store, args),
    }
}

/// Create mode: draft, review and submit a PR for the current branch.
fn run_create(cli: &Cli, store: &ConfigStore, args: &CreateArgs) -> Result<()> {
    let settings = setup::resolve_settings(cli, store);
    let llm = setup::build_llm_client(cli, &settings)?;
    let editor = ExternalEditor::from_env();

    let deps = Collaborators {
        vcs: &GitCli,
        host: &GhCli,
        llm: llm.as_ref(),
        editor: &editor,
    };
    let opts = CreateOptions {
        base: args.base.clone(),
    };

    let mut term = Terminal::new(io::stdin().lock(), io::stdout());
    match workflow::run_create(&opts, &settings, &deps, &mut term)? {
        Outcome::Created(Some(pr)) => log::info!("Created PR #{} ({})", pr.number, pr.title),
        Outcome::Created(None) => log::info!("Created PR, number not resolved"),
        Outcome::Updated(pr) => log::info!("Updated PR #{} ({})", pr.number, pr.title),
        Outcome::Cancelled | Outcome::NoChanges => {}
    }
    Ok(())
}

fn run_config(store: &ConfigStore, args: &ConfigArgs) -> Result<()> {
    match (&args.action, &args.key, &args.value) {
        (Some(ConfigAction::Show), _, _) => {
            show_config(store);
            Ok(())
        }
        (Some(ConfigAction::Reset), _, _) => {
            store.reset()?;
            println!("Configuration reset to default values.");
            Ok(())
        }
        (None, Some(key), Some(value)) => {
            store.set(key, value)?;
            println!("Configuration updated: {key}");
            Ok(())
        }
        _ => {
            let mut cmd = Cli::command();
            if let Some(config_cmd) = cmd.find_subcommand_mut("config") {
                config_cmd.print_help()?;
            }
            bail!("insufficient arguments for config command");
        }
    }
}

fn show_config(store: &ConfigStore) {
    let settings = store.load();

    println!("Config file: {}", store.path().display());
    for key in SettingKey::ALL {
        let value = match key {
            SettingKey::ApiKey => mask_secret(settings.get(key)),
            _ => settings.get(key).to_string(),
        };
        println!("{}: {}", key.as_str().bold(), value);
    }
}
