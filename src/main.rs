//! Treepick CLI application entry point
//!
//! Opens an interactive picker over a directory tree or a JSON document and
//! prints the ids of the picked nodes (paths or JSON pointers), one per line,
//! on stdout. Prompts and messages go to stderr, so the output can be piped.
//!
//! # Usage
//!
//! ```bash
//! # Pick one file below the current directory
//! treepick files .
//!
//! # Pick several images, never leaving ~/Pictures
//! treepick files ~/Pictures --root ~/Pictures -p '*.png' -p 're:.*\.jpe?g' --multi
//!
//! # Pick a leaf of a JSON tree whose children live under "items"
//! treepick json regions.json --children-key items --select leaves-only
//!
//! # Show where the configuration lives
//! treepick config path
//! ```
//!
//! The exit status is 0 when something was committed and 1 when the picker
//! was cancelled; errors exit with 2. Set `TREEPICK_LOG` (e.g. `TREEPICK_LOG=debug`) for
//! diagnostics.

use std::process::ExitCode;

use ::config::ConfigError;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use treepick::{
    TreepickError,
    cli::{Cli, Commands, ConfigCommands},
    config::{AppConfig, PickerConfig},
    engine::{PickerEngine, SortPolicy},
    host::{
        ConsoleObserver, DialoguerInput, HostOptions, HostOutcome, OutputWriter, PickerHost,
        StdoutWriter,
    },
    provider::{FileProvider, JsonProvider, NodeProvider},
};

type Result<T> = std::result::Result<T, TreepickError>;

fn init_logging() {
    let filter = EnvFilter::try_from_env("TREEPICK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    Ok(config)
}

/// Run one interactive session and print the result
fn pick<P: NodeProvider>(
    provider: P,
    config: PickerConfig,
    options: HostOptions,
    quiet: bool,
) -> Result<ExitCode> {
    let output = StdoutWriter::new();
    let input = DialoguerInput::new();
    let mut engine = PickerEngine::new(provider, ConsoleObserver::new(&output), config);
    let host = PickerHost::new(&input, &output, options);

    match host.run(&mut engine)? {
        HostOutcome::Committed(picked) => {
            for node in &picked {
                output.write(node.id.as_str());
            }
            if !quiet {
                output.success(&format!("{} item(s) picked", picked.len()));
            }
            Ok(ExitCode::SUCCESS)
        }
        HostOutcome::Cancelled => {
            if !quiet {
                output.info("Cancelled");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn handle_config_command(config: &AppConfig, cli: &Cli, command: ConfigCommands) -> Result<()> {
    let output = StdoutWriter::new();
    match command {
        ConfigCommands::Path => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => AppConfig::config_path()?,
            };
            output.write(&path.display().to_string());
        }
        ConfigCommands::Show => {
            let text = toml::to_string_pretty(config)
                .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;
            output.write(&text);
        }
    }
    Ok(())
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let config = load_config(cli)?;
    debug!(?config, "configuration loaded");

    match &cli.command {
        Commands::Files {
            start,
            source,
            picker,
        } => {
            let files = source.apply(config.files, start.clone());
            let picker = picker.apply(config.picker, Some(SortPolicy::default()));
            let provider = FileProvider::new(files, config.format)?;
            pick(provider, picker, HostOptions::for_files(), cli.quiet)
        }
        Commands::Json {
            file,
            source,
            picker,
        } => {
            let json = source.apply(config.json);
            let picker = picker.apply(config.picker, None);
            let provider = JsonProvider::from_path(file, json)?;
            pick(provider, picker, HostOptions::for_json(), cli.quiet)
        }
        Commands::Config(command) => {
            handle_config_command(&config, cli, *command)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse_args();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            StdoutWriter::new().error(&e.to_string());
            ExitCode::from(2)
        }
    }
}
