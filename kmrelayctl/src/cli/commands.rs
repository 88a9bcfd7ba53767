//! CLI command and subcommand definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::MAX_TOGGLE_DELAY_MS;

/// KMTronic USB Relay CLI
#[derive(Parser, Debug)]
#[command(name = "kmrelayctl")]
#[command(version, about = "KMTronic USB Relay CLI", long_about = None)]
pub struct Cli {
    /// Serial port, bypassing auto-detection (overrides config file)
    #[arg(short, long, global = true)]
    pub port: Option<String>,

    /// Output format (overrides config file)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Don't load config file
    #[arg(long)]
    pub no_config: bool,

    /// Config file path (default: ~/.config/kmrelay/cli.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty table output
    Table,
    /// JSON output
    Json,
}

impl From<&OutputFormat> for crate::format::OutputFormat {
    fn from(format: &OutputFormat) -> Self {
        match format {
            OutputFormat::Table => crate::format::OutputFormat::Table,
            OutputFormat::Json => crate::format::OutputFormat::Json,
        }
    }
}

impl OutputFormat {
    /// Config-file name of this format
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Table => "table",
            OutputFormat::Json => "json",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List serial ports and show which one auto-detection picks
    Ports,

    /// Show board information
    Info,

    /// Energize a relay channel
    On {
        /// Channel index (0-3)
        channel: usize,
    },

    /// De-energize a relay channel
    Off {
        /// Channel index (0-3)
        channel: usize,
    },

    /// Energize a channel, wait, then de-energize it
    Toggle {
        /// Channel index (0-3)
        channel: usize,

        /// Time to hold the relay on, in milliseconds (overrides config file)
        #[arg(long, value_parser = clap::value_parser!(u64).range(..=MAX_TOGGLE_DELAY_MS))]
        delay_ms: Option<u64>,
    },

    /// Energize every channel
    AllOn,

    /// De-energize every channel
    AllOff,

    /// Show or manage CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Relay switching operations that need an open board
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchCommand {
    On(usize),
    Off(usize),
    Toggle { channel: usize, delay_ms: u64 },
    AllOn,
    AllOff,
}

impl SwitchCommand {
    /// Extract the switching operation from a parsed command, if any
    ///
    /// `default_delay_ms` applies to `toggle` without `--delay-ms`.
    pub fn from_command(command: &Commands, default_delay_ms: u64) -> Option<Self> {
        match command {
            Commands::On { channel } => Some(SwitchCommand::On(*channel)),
            Commands::Off { channel } => Some(SwitchCommand::Off(*channel)),
            Commands::Toggle { channel, delay_ms } => Some(SwitchCommand::Toggle {
                channel: *channel,
                delay_ms: delay_ms.unwrap_or(default_delay_ms),
            }),
            Commands::AllOn => Some(SwitchCommand::AllOn),
            Commands::AllOff => Some(SwitchCommand::AllOff),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_on_with_global_port() {
        let cli = Cli::try_parse_from(["kmrelayctl", "on", "2", "--port", "/dev/ttyUSB0"]).unwrap();

        assert_eq!(cli.port.as_deref(), Some("/dev/ttyUSB0"));
        assert!(matches!(cli.command, Commands::On { channel: 2 }));
    }

    #[test]
    fn test_parse_rejects_negative_channel() {
        assert!(Cli::try_parse_from(["kmrelayctl", "off", "-1"]).is_err());
    }

    #[test]
    fn test_switch_command_toggle_delay() {
        let cli = Cli::try_parse_from(["kmrelayctl", "toggle", "1"]).unwrap();
        assert_eq!(
            SwitchCommand::from_command(&cli.command, 1000),
            Some(SwitchCommand::Toggle {
                channel: 1,
                delay_ms: 1000
            })
        );

        let cli = Cli::try_parse_from(["kmrelayctl", "toggle", "1", "--delay-ms", "250"]).unwrap();
        assert_eq!(
            SwitchCommand::from_command(&cli.command, 1000),
            Some(SwitchCommand::Toggle {
                channel: 1,
                delay_ms: 250
            })
        );
    }

    #[test]
    fn test_toggle_delay_upper_bound() {
        let max = MAX_TOGGLE_DELAY_MS.to_string();
        let args = ["kmrelayctl", "toggle", "0", "--delay-ms", max.as_str()];
        assert!(Cli::try_parse_from(args).is_ok());

        let over = (MAX_TOGGLE_DELAY_MS + 1).to_string();
        let args = ["kmrelayctl", "toggle", "0", "--delay-ms", over.as_str()];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_non_switch_commands() {
        let cli = Cli::try_parse_from(["kmrelayctl", "ports"]).unwrap();
        assert_eq!(SwitchCommand::from_command(&cli.command, 1000), None);

        let cli = Cli::try_parse_from(["kmrelayctl", "all-on"]).unwrap();
        assert_eq!(
            SwitchCommand::from_command(&cli.command, 1000),
            Some(SwitchCommand::AllOn)
        );
    }
}
