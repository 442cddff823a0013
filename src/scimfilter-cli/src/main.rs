use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use anyhow::{bail, Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};

use scimfilter_cli::cli::{parse_args, CliConfig, Commands, ConfigCommands};
use scimfilter_cli::config::{create_default_config_file, Config};
use scimfilter_cli::output::{error_body, OutputWriter};
use scimfilter_parser::{FilterError, FilterParser, ResourceSelector};

fn main() {
    if let Err(e) = run() {
        match e.downcast_ref::<FilterError>() {
            Some(filter_error) => eprintln!("{}", error_body(filter_error)),
            None => eprintln!("Error: {e:#}"),
        }
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = parse_args();
    let cli_config = CliConfig::from(&args);

    // Load configuration
    let mut config = Config::load(cli_config.config_file.as_deref())?;
    config.apply_cli(&cli_config);
    config.validate()?;

    setup_logging(&config);
    debug!("effective configuration: {config:?}");

    handle_command(args.command, &config)
}

fn handle_command(command: Commands, config: &Config) -> Result<()> {
    let parser = FilterParser::with_options(config.parser_options());
    let writer = OutputWriter::new(config.output.clone());

    match command {
        Commands::Parse { filter, file, .. } => {
            let text = read_filter(filter, file.as_deref())?;
            let parsed = parser.parse(&text)?;
            writer.write_to_stdout(&parsed)
        }
        Commands::Check { filter, file } => {
            let text = read_filter(filter, file.as_deref())?;
            let parsed = parser.parse(&text)?;
            info!("filter has {} top-level statement(s)", parsed.len());
            println!("Filter is valid");
            Ok(())
        }
        Commands::Id { id, .. } => {
            let selector = ResourceSelector::from(id);
            match selector.resolve(&parser)? {
                Some(parsed) => writer.write_to_stdout(&parsed),
                None => Ok(()),
            }
        }
        Commands::Config { command } => handle_config_command(command, config),
    }
}

fn handle_config_command(command: ConfigCommands, config: &Config) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
            print!("{yaml}");
            Ok(())
        }
        ConfigCommands::Init { path, force } => {
            if path.exists() && !force {
                bail!(
                    "Config file already exists: {}\n\n\
                    Use --force to overwrite:\n  \
                    scimfilter config init {} --force",
                    path.display(),
                    path.display()
                );
            }
            create_default_config_file(&path)?;
            println!("Created config file: {}", path.display());
            Ok(())
        }
    }
}

/// Filter text from the argument, the file, or stdin when it is piped
fn read_filter(filter: Option<String>, file: Option<&Path>) -> Result<String> {
    if let Some(filter) = filter {
        return Ok(filter);
    }

    if let Some(path) = file {
        debug!("reading filter from {}", path.display());
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read filter file {}", path.display()));
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        bail!("No filter given\n\nPass a filter argument, use --file, or pipe it on stdin");
    }

    debug!("reading filter from stdin");
    let mut text = String::new();
    stdin
        .lock()
        .read_to_string(&mut text)
        .context("Failed to read filter from stdin")?;
    Ok(text)
}

fn setup_logging(config: &Config) {
    let log_level = match config.debug.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new().filter_level(log_level).init();
}
