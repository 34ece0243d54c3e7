//! `hbnb`: interactive console over the JSON file store.

use anyhow::Context;
use clap::Parser;
use hbnb_rs_config::HbnbConfig;
use hbnb_rs_console::{Console, SessionOptions, parse_words};
use hbnb_rs_core::{FileStorage, builtin_type_registry};
use log::{info, warn};
use std::io::{self, IsTerminal};
use std::path::PathBuf;

/// Command-line options for the console.
#[derive(Parser)]
#[command(name = "hbnb", version)]
struct Cli {
    /// Optional path to an hbnb.json5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Backing file override
    #[arg(long)]
    file: Option<PathBuf>,
    /// Prompt override
    #[arg(long)]
    prompt: Option<String>,
    /// Run a single command instead of reading stdin
    #[arg(trailing_var_arg = true)]
    command: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();

    let cli = Cli::parse();
    let cwd = std::env::current_dir().context("failed to resolve working directory")?;
    let mut config = match &cli.config {
        Some(path) => HbnbConfig::load_from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => HbnbConfig::load_default(&cwd).context("failed to load config")?,
    };
    if let Some(file) = cli.file {
        config.storage.path = file;
    }
    if let Some(prompt) = cli.prompt {
        config.console.prompt = prompt;
    }
    config.validate()?;
    info!(
        "starting console (storage={}, one_shot={})",
        config.storage.path.display(),
        !cli.command.is_empty()
    );

    let mut storage = FileStorage::open(&config.storage.path, builtin_type_registry())
        .with_context(|| format!("failed to load {}", config.storage.path.display()))?
        .with_pretty(config.storage.pretty);

    let stdout = io::stdout();
    let mut console = Console::new(&mut storage);
    if cli.command.is_empty() {
        let stdin = io::stdin();
        let interactive = stdin.is_terminal();
        let options = SessionOptions {
            prompt: interactive.then(|| config.console.prompt.clone()),
            echo: !interactive && config.console.echo,
        };
        console.run(stdin.lock(), stdout.lock(), &options)?;
    } else {
        console.dispatch(parse_words(cli.command), &mut stdout.lock())?;
    }

    if let Err(err) = storage.flush() {
        warn!("failed to flush storage on exit: {err}");
        return Err(err.into());
    }
    Ok(())
}
