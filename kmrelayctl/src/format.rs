//! Output formatting utilities for the CLI
//!
//! Provides table and JSON formatting with colors.

use anyhow::Result;
use colored::*;
use kmrelay_core::{BoardInfo, ControllerStatus, PortInfo, RelayState};
use serde::Serialize;

use tabled::{settings::Style, Table, Tabled};

/// Output format options
#[derive(Debug, Clone)]
pub enum OutputFormat {
    Table,
    Json,
}

fn format_id(id: Option<u16>) -> String {
    id.map(|id| format!("{:04X}", id))
        .unwrap_or_else(|| "-".to_string())
}

/// Port listing entry with the auto-detection verdict
#[derive(Debug, Serialize)]
struct PortEntry<'a> {
    #[serde(flatten)]
    port: &'a PortInfo,
    selected: bool,
}

/// Format serial port listing
///
/// `selected` is the path auto-detection would pick, if any.
pub fn format_ports(
    ports: &[PortInfo],
    selected: Option<&str>,
    format: &OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<PortEntry> = ports
                .iter()
                .map(|port| PortEntry {
                    port,
                    selected: Some(port.path.as_str()) == selected,
                })
                .collect();
            Ok(serde_json::to_string_pretty(&entries)?)
        }
        OutputFormat::Table => {
            if ports.is_empty() {
                return Ok("No serial ports found".yellow().to_string());
            }

            #[derive(Tabled)]
            struct PortRow {
                #[tabled(rename = "Port")]
                path: String,
                #[tabled(rename = "VID")]
                vid: String,
                #[tabled(rename = "PID")]
                pid: String,
                #[tabled(rename = "Description")]
                description: String,
                #[tabled(rename = "Relay")]
                selected: String,
            }

            let rows: Vec<PortRow> = ports
                .iter()
                .map(|port| PortRow {
                    path: port.path.clone(),
                    vid: format_id(port.vid),
                    pid: format_id(port.pid),
                    description: port.description.clone(),
                    selected: if Some(port.path.as_str()) == selected {
                        "✓".green().to_string()
                    } else {
                        String::new()
                    },
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!("{}\n{}", "Serial Ports:".bold(), table))
        }
    }
}

/// Format board information
pub fn format_board(board: &BoardInfo, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(board)?),
        OutputFormat::Table => {
            let mut output = String::new();
            output.push_str(&board.name.bold().to_string());
            output.push('\n');
            output.push_str(&format!(
                "Channels: {}",
                board.channel_count.to_string().cyan()
            ));
            output.push('\n');
            output.push_str(&format!(
                "USB ID: {}:{}",
                format!("{:04X}", board.usb_vid).cyan(),
                format!("{:04X}", board.usb_pid).cyan()
            ));
            output.push('\n');
            output.push_str(&format!(
                "Serial: {} baud, 8N1, {} ms timeout",
                board.baud_rate.to_string().yellow(),
                board.timeout_ms
            ));
            Ok(output)
        }
    }
}

fn format_state(state: RelayState) -> String {
    match state {
        RelayState::Energized => "ON".green().bold().to_string(),
        RelayState::DeEnergized => "OFF".dimmed().to_string(),
    }
}

/// Format controller status (assumed channel states)
pub fn format_status(status: &ControllerStatus, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(status)?),
        OutputFormat::Table => {
            #[derive(Tabled)]
            struct ChannelRow {
                #[tabled(rename = "Channel")]
                index: usize,
                #[tabled(rename = "Relay")]
                relay: usize,
                #[tabled(rename = "State")]
                state: String,
            }

            let rows: Vec<ChannelRow> = status
                .channels
                .iter()
                .map(|c| ChannelRow {
                    index: c.index,
                    relay: c.relay,
                    state: format_state(c.state),
                })
                .collect();

            let table = Table::new(rows).with(Style::rounded()).to_string();
            Ok(format!(
                "{} {}\n{}",
                "Relay Status:".bold(),
                status.port.cyan(),
                table
            ))
        }
    }
}

/// Format success message
pub fn format_success(message: &str) -> String {
    format!("{} {}", "✓".green().bold(), message)
}
