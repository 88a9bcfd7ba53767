//! Serial port enumeration and relay board discovery
//!
//! Selection is first-match-wins: the board's exact VID/PID pair beats any
//! description match, wherever it appears in the port list. Only when no
//! port carries the pair are ports whose description names a common
//! USB-serial bridge accepted.

use kmrelay_core::{BoardConfig, PortInfo, RelayError, Result};
use serialport::{available_ports, SerialPortType};
use tracing::{debug, error};

/// Build a `PortInfo` from the serialport crate's port description
fn port_info_from_serialport(name: String, port_type: &SerialPortType) -> PortInfo {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let description = usb
                .product
                .clone()
                .or_else(|| usb.manufacturer.clone())
                .unwrap_or_else(|| "n/a".to_string());
            PortInfo {
                path: name,
                vid: Some(usb.vid),
                pid: Some(usb.pid),
                manufacturer: usb.manufacturer.clone(),
                product: usb.product.clone(),
                serial_number: usb.serial_number.clone(),
                description,
            }
        }
        SerialPortType::PciPort => PortInfo::new(name).with_description("PCI serial port"),
        SerialPortType::BluetoothPort => {
            PortInfo::new(name).with_description("Bluetooth serial port")
        }
        SerialPortType::Unknown => PortInfo::new(name),
    }
}

/// Enumerate all serial ports on the system
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = available_ports().map_err(|e| {
        error!("Failed to enumerate serial ports: {}", e);
        RelayError::Enumeration(e.to_string())
    })?;

    let ports: Vec<PortInfo> = ports
        .into_iter()
        .map(|p| port_info_from_serialport(p.port_name, &p.port_type))
        .collect();

    debug!("Found {} serial port(s)", ports.len());
    Ok(ports)
}

/// Check whether a port's description names one of the fallback bridges
fn matches_fallback_description(port: &PortInfo, fragments: &[&str]) -> bool {
    let description = port.description.to_lowercase();
    fragments.iter().any(|fragment| description.contains(fragment))
}

/// Pick the port of board `B` from an already enumerated list
pub fn select_device_port<B: BoardConfig>(ports: &[PortInfo]) -> Option<&PortInfo> {
    if let Some(port) = ports
        .iter()
        .find(|p| p.matches_usb_ids(B::USB_VID, B::USB_PID))
    {
        debug!(
            "Matched {} by VID:0x{:04X} PID:0x{:04X} at {}",
            B::NAME,
            B::USB_VID,
            B::USB_PID,
            port.path
        );
        return Some(port);
    }

    let port = ports
        .iter()
        .find(|p| matches_fallback_description(p, B::FALLBACK_DESCRIPTIONS))?;
    debug!(
        "Matched {} by description '{}' at {}",
        B::NAME,
        port.description,
        port.path
    );
    Some(port)
}

/// Find the serial port of board `B`
///
/// Enumerates the system's ports and applies `select_device_port`.
pub fn find_device_port<B: BoardConfig>() -> Result<String> {
    debug!(
        "Searching for {} (VID:0x{:04X}, PID:0x{:04X})",
        B::NAME,
        B::USB_VID,
        B::USB_PID
    );

    let ports = list_ports()?;
    for port in &ports {
        debug!(
            "Checking port: {} ({}) VID:{:?} PID:{:?}",
            port.path, port.description, port.vid, port.pid
        );
    }

    match select_device_port::<B>(&ports) {
        Some(port) => Ok(port.path.clone()),
        None => {
            error!("{} not found", B::NAME);
            Err(RelayError::DeviceNotFound)
        }
    }
}
