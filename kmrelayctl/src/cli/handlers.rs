//! Command execution handlers

use anyhow::{Context, Result};
use kmrelay_core::{BoardInfo, DefaultBoard, PortInfo};
use kmrelay_hardware::{select_device_port, KmtronicRelay, RelayController, SerialTransport};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::config::CliConfig;
use crate::format::{format_board, format_ports, format_status, format_success};

use super::commands::*;

/// Handle ports command
pub fn handle_ports(format: &OutputFormat) -> Result<()> {
    let ports = KmtronicRelay::list_available_ports()?;
    println!("{}", render_ports(&ports, format)?);
    Ok(())
}

fn render_ports(ports: &[PortInfo], format: &OutputFormat) -> Result<String> {
    let selected = select_device_port::<DefaultBoard>(ports).map(|p| p.path.as_str());
    format_ports(ports, selected, &format.into())
}

/// Handle info command
pub fn handle_info(format: &OutputFormat) -> Result<()> {
    let board = BoardInfo::of::<DefaultBoard>();
    println!("{}", format_board(&board, &format.into())?);
    Ok(())
}

/// Apply a switching command to an open controller
///
/// Returns the confirmation message for table output.
pub fn apply_switch<T: SerialTransport + ?Sized>(
    relay: &mut RelayController<T>,
    command: &SwitchCommand,
) -> Result<String> {
    let message = match *command {
        SwitchCommand::On(channel) => {
            relay.turn_on(channel)?;
            format!("Channel {} energized", channel)
        }
        SwitchCommand::Off(channel) => {
            relay.turn_off(channel)?;
            format!("Channel {} de-energized", channel)
        }
        SwitchCommand::Toggle { channel, delay_ms } => {
            relay.toggle(channel, Duration::from_millis(delay_ms))?;
            format!("Channel {} toggled for {} ms", channel, delay_ms)
        }
        SwitchCommand::AllOn => {
            relay.turn_all_on()?;
            "All channels energized".to_string()
        }
        SwitchCommand::AllOff => {
            relay.turn_all_off()?;
            "All channels de-energized".to_string()
        }
    };
    Ok(message)
}

/// Run a switching command against a controller and print the outcome
pub fn run_switch<T: SerialTransport + ?Sized>(
    relay: &mut RelayController<T>,
    command: &SwitchCommand,
    format: &OutputFormat,
) -> Result<()> {
    let message = match apply_switch(relay, command) {
        Ok(message) => message,
        Err(e) => {
            // Earlier channels of an all-on/all-off may already have switched
            if let Ok(report) = failure_report(relay, format) {
                eprintln!("{}", report);
            }
            return Err(e);
        }
    };

    match format {
        OutputFormat::Json => {
            println!("{}", format_status(&relay.status(), &format.into())?);
        }
        OutputFormat::Table => {
            println!("{}", format_success(&message));
            println!("{}", format_status(&relay.status(), &format.into())?);
        }
    }

    Ok(())
}

/// Assumed channel states after a switching command failed
pub fn failure_report<T: SerialTransport + ?Sized>(
    relay: &RelayController<T>,
    format: &OutputFormat,
) -> Result<String> {
    let status = format_status(&relay.status(), &format.into())?;
    Ok(match format {
        OutputFormat::Json => status,
        OutputFormat::Table => format!("Channel states before the failure:\n{}", status),
    })
}

/// Handle relay switching commands
///
/// Opens the board on `port` (or auto-detects it), runs the command and
/// closes the port.
pub fn handle_switch(
    port: Option<&str>,
    command: &SwitchCommand,
    format: &OutputFormat,
) -> Result<()> {
    debug!("Running {:?} (port: {:?})", command, port);

    let mut relay = KmtronicRelay::open(port).with_context(|| match port {
        Some(port) => format!("Cannot open relay board on {}", port),
        None => "Cannot auto-detect relay board; pass --port to select it".to_string(),
    })?;

    let result = run_switch(&mut relay, command, format);
    relay.close();
    result
}

/// Handle config commands
pub fn handle_config(
    command: ConfigCommands,
    config: &CliConfig,
    config_path: &Path,
    format: &OutputFormat,
) -> Result<()> {
    match command {
        ConfigCommands::Show => match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(config)?);
            }
            OutputFormat::Table => {
                println!("{}", toml::to_string_pretty(config)?);
            }
        },
        ConfigCommands::Path => {
            println!("{}", config_path.display());
        }
        ConfigCommands::Init { force } => {
            if config_path.exists() && !force {
                return Err(anyhow::anyhow!(
                    "Config file {} already exists (use --force to overwrite)",
                    config_path.display()
                ));
            }
            config.save_to(config_path)?;
            println!(
                "{}",
                format_success(&format!("Wrote {}", config_path.display()))
            );
        }
    }

    Ok(())
}

/// Generate shell completion script
pub fn generate_completion(shell: clap_complete::Shell) {
    use clap::CommandFactory;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use kmrelay_core::{RelayError, RelayState};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    struct MockTransport {
        sent: Arc<Mutex<Vec<Vec<u8>>>>,
        fail_after: Option<usize>,
        open: bool,
    }

    impl SerialTransport for MockTransport {
        fn send(&mut self, frame: &[u8]) -> kmrelay_core::Result<()> {
            if !self.open {
                return Err(RelayError::WriteFailure("not open".to_string()));
            }
            let mut sent = self.sent.lock().unwrap();
            if self.fail_after.is_some_and(|limit| sent.len() >= limit) {
                return Err(RelayError::WriteFailure("Broken pipe".to_string()));
            }
            sent.push(frame.to_vec());
            Ok(())
        }

        fn close(&mut self) {
            self.open = false;
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn port_path(&self) -> Option<&str> {
            Some("/dev/mock0")
        }
    }

    fn mock_controller() -> (RelayController<MockTransport>, Arc<Mutex<Vec<Vec<u8>>>>) {
        failing_controller(None)
    }

    fn failing_controller(
        fail_after: Option<usize>,
    ) -> (RelayController<MockTransport>, Arc<Mutex<Vec<Vec<u8>>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = MockTransport {
            sent: sent.clone(),
            fail_after,
            open: true,
        };
        (
            RelayController::with_transport(Box::new(transport), BoardInfo::of::<DefaultBoard>()),
            sent,
        )
    }

    #[test]
    fn test_apply_switch_on_off() {
        let (mut relay, sent) = mock_controller();

        let msg = apply_switch(&mut relay, &SwitchCommand::On(1)).unwrap();
        assert_eq!(msg, "Channel 1 energized");
        assert_eq!(relay.get_state(1).unwrap(), RelayState::Energized);

        apply_switch(&mut relay, &SwitchCommand::Off(1)).unwrap();
        assert_eq!(
            *sent.lock().unwrap(),
            vec![vec![0xFF, 0x02, 0x01], vec![0xFF, 0x02, 0x00]]
        );
    }

    #[test]
    fn test_apply_switch_all() {
        let (mut relay, sent) = mock_controller();

        apply_switch(&mut relay, &SwitchCommand::AllOn).unwrap();
        assert_eq!(relay.status().energized_count(), 4);

        apply_switch(&mut relay, &SwitchCommand::AllOff).unwrap();
        assert_eq!(relay.status().energized_count(), 0);
        assert_eq!(sent.lock().unwrap().len(), 8);
    }

    #[test]
    fn test_apply_switch_toggle() {
        let (mut relay, sent) = mock_controller();

        let msg = apply_switch(
            &mut relay,
            &SwitchCommand::Toggle {
                channel: 0,
                delay_ms: 5,
            },
        )
        .unwrap();

        assert_eq!(msg, "Channel 0 toggled for 5 ms");
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_apply_switch_invalid_channel() {
        let (mut relay, sent) = mock_controller();

        let err = apply_switch(&mut relay, &SwitchCommand::On(4)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RelayError>(),
            Some(RelayError::InvalidChannel { .. })
        ));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[test]
    fn test_run_switch_json() {
        let (mut relay, _sent) = mock_controller();
        assert!(run_switch(&mut relay, &SwitchCommand::On(3), &OutputFormat::Json).is_ok());
    }

    #[test]
    fn test_partial_all_on_reports_switched_channels() {
        let (mut relay, sent) = failing_controller(Some(2));

        let result = run_switch(&mut relay, &SwitchCommand::AllOn, &OutputFormat::Table);
        assert!(matches!(
            result.unwrap_err().downcast_ref::<RelayError>(),
            Some(RelayError::WriteFailure(_))
        ));
        assert_eq!(sent.lock().unwrap().len(), 2);

        let report = failure_report(&relay, &OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(parsed["channels"][0]["state"], "energized");
        assert_eq!(parsed["channels"][1]["state"], "energized");
        assert_eq!(parsed["channels"][2]["state"], "de_energized");
        assert_eq!(parsed["channels"][3]["state"], "de_energized");

        let report = failure_report(&relay, &OutputFormat::Table).unwrap();
        assert!(report.starts_with("Channel states before the failure:"));
    }

    #[test]
    fn test_render_ports_marks_device() {
        let ports = vec![
            PortInfo::new("/dev/ttyUSB0").with_description("FTDI bridge"),
            PortInfo::new("/dev/ttyUSB1").with_usb_ids(0x1337, 0x0088),
        ];
        let output = render_ports(&ports, &OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[0]["selected"], false);
        assert_eq!(parsed[1]["selected"], true);
    }

    #[test]
    fn test_config_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cli.toml");
        let config = CliConfig::default();

        handle_config(
            ConfigCommands::Init { force: false },
            &config,
            &path,
            &OutputFormat::Table,
        )
        .unwrap();
        assert!(path.exists());

        let result = handle_config(
            ConfigCommands::Init { force: false },
            &config,
            &path,
            &OutputFormat::Table,
        );
        assert!(result.is_err());

        assert!(handle_config(
            ConfigCommands::Init { force: true },
            &config,
            &path,
            &OutputFormat::Table,
        )
        .is_ok());
    }
}
