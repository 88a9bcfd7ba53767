//! KMRelay CLI
//!
//! Command-line interface for switching KMTronic USB relay boards.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use kmrelayctl::cli::{
    generate_completion, handle_config, handle_info, handle_ports, handle_switch, Cli, Commands,
    OutputFormat, SwitchCommand,
};
use kmrelayctl::config::CliConfig;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build configuration using priority chain: CLI args → env → file → defaults
    let mut builder = CliConfig::builder();

    if let Some(ref port) = cli.port {
        builder = builder.with_port(port.as_str())?;
    }
    if let Some(ref format) = cli.format {
        builder = builder.with_output_format(format.as_str())?;
    }
    if cli.verbose {
        builder = builder.with_verbose(true);
    }

    builder = builder.with_env_overrides();

    // Only resolved when a file is actually read
    if !cli.no_config {
        let config_path = CliConfig::resolve_path(cli.config.as_deref())?;
        builder = builder.with_config_file(&config_path)?;
    }

    // Build final configuration with validation
    let config = match builder.build() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.verbose);

    let output_format =
        OutputFormat::from_str(&config.output_format, true).unwrap_or(OutputFormat::Table);
    debug!("Effective configuration: {:?}", config);

    let result = if let Some(switch) =
        SwitchCommand::from_command(&cli.command, config.toggle_delay_ms)
    {
        handle_switch(config.port.as_deref(), &switch, &output_format)
    } else {
        match cli.command {
            Commands::Ports => handle_ports(&output_format),
            Commands::Info => handle_info(&output_format),
            Commands::Config { command } => CliConfig::resolve_path(cli.config.as_deref())
                .and_then(|path| handle_config(command, &config, &path, &output_format)),
            Commands::Completion { shell } => {
                generate_completion(shell);
                Ok(())
            }
            _ => Ok(()),
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        if config.verbose {
            eprintln!("Error details: {:?}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
