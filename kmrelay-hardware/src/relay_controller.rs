//! Relay Controller - High-level interface for relay control
//!
//! Maps zero-based channel indices and target states to protocol frames and
//! tracks the last state sent to each channel. The board has no readback, so
//! tracked state is what was sent, not what the hardware reports.

use crate::discovery;
use crate::protocol::CommandFrame;
use crate::serial_driver::{SerialDriver, SerialTransport};
use kmrelay_core::board::validate_channel;
use kmrelay_core::{
    BoardConfig, BoardInfo, ChannelStatus, ControllerStatus, DefaultBoard, PortInfo,
    RelayChannel, RelayError, RelayState, Result,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Controller for the default KMTronic board over a real serial port
pub type KmtronicRelay = RelayController<SerialDriver<DefaultBoard>>;

/// Relay controller interface
///
/// Generic over the transport type, allowing real hardware (`SerialDriver`)
/// or mock transports for testing. Dropping the controller closes the
/// transport.
pub struct RelayController<T: SerialTransport + ?Sized = dyn SerialTransport> {
    transport: Box<T>,
    board: BoardInfo,
    port: String,
    channels: Vec<RelayChannel>,
}

impl<B: BoardConfig> RelayController<SerialDriver<B>> {
    /// Auto-detect the board and connect to it
    pub fn connect() -> Result<Self> {
        let port = discovery::find_device_port::<B>()?;
        Self::connect_to(&port)
    }

    /// Connect to the board on an explicit port, bypassing discovery
    pub fn connect_to(port: &str) -> Result<Self> {
        let driver = SerialDriver::<B>::open(port)?;
        info!("Connected to {} on {}", B::NAME, port);
        Ok(Self::with_transport(Box::new(driver), BoardInfo::of::<B>()))
    }

    /// Connect to `port` if given, otherwise auto-detect
    pub fn open(port: Option<&str>) -> Result<Self> {
        match port {
            Some(port) => Self::connect_to(port),
            None => Self::connect(),
        }
    }

    /// Run `f` against a freshly opened controller and close it afterwards
    ///
    /// The transport is closed whether `f` succeeds or fails.
    ///
    /// ```no_run
    /// use kmrelay_hardware::KmtronicRelay;
    ///
    /// # fn example() -> kmrelay_core::Result<()> {
    /// KmtronicRelay::session(Some("/dev/ttyUSB0"), |relay| {
    ///     relay.turn_on(0)?;
    ///     relay.turn_off(0)
    /// })?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn session<R>(port: Option<&str>, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        let mut controller = Self::open(port)?;
        let result = f(&mut controller);
        controller.close();
        result
    }

    /// List every serial port on the system
    pub fn list_available_ports() -> Result<Vec<PortInfo>> {
        discovery::list_ports()
    }
}

impl<T: SerialTransport + ?Sized> RelayController<T> {
    /// Create a controller over an already open transport
    ///
    /// Channels start de-energized; the hardware is not queried or reset.
    pub fn with_transport(transport: Box<T>, board: BoardInfo) -> Self {
        let port = transport.port_path().unwrap_or_default().to_string();
        let channels = (0..board.channel_count).map(RelayChannel::new).collect();
        Self {
            transport,
            board,
            port,
            channels,
        }
    }

    /// Port path the controller was opened on
    pub fn port(&self) -> &str {
        &self.port
    }

    /// Board this controller drives
    pub fn board(&self) -> &BoardInfo {
        &self.board
    }

    /// Number of relay channels
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// All channels, ascending by index
    pub fn channels(&self) -> &[RelayChannel] {
        &self.channels
    }

    /// Whether the transport is still open
    pub fn is_connected(&self) -> bool {
        self.transport.is_open()
    }

    fn ensure_connected(&self) -> Result<()> {
        if !self.transport.is_open() {
            return Err(RelayError::NotConnected);
        }
        Ok(())
    }

    /// Last state sent to a channel
    ///
    /// Still answers after `close()`, reporting the state at close time.
    pub fn get_state(&self, channel: usize) -> Result<RelayState> {
        validate_channel(channel, self.channels.len())?;
        Ok(self.channels[channel].state())
    }

    /// Drive a channel to `state`
    ///
    /// The tracked state changes only if the frame was sent.
    pub fn set_state(&mut self, channel: usize, state: RelayState) -> Result<()> {
        self.ensure_connected()?;
        validate_channel(channel, self.channels.len())?;

        let frame =
            CommandFrame::for_channel(channel, state).ok_or(RelayError::InvalidChannel {
                channel,
                channel_count: self.channels.len(),
            })?;

        debug!(
            "Setting relay {} (channel {}) {}",
            frame.relay_number(),
            channel,
            state
        );

        self.transport.send(frame.as_bytes())?;
        self.channels[channel].record(state);

        Ok(())
    }

    /// Energize a channel
    pub fn turn_on(&mut self, channel: usize) -> Result<()> {
        self.set_state(channel, RelayState::Energized)
    }

    /// De-energize a channel
    pub fn turn_off(&mut self, channel: usize) -> Result<()> {
        self.set_state(channel, RelayState::DeEnergized)
    }

    /// Drive every channel to `state` in ascending order
    ///
    /// Stops at the first failure. Frames already sent are not rolled back,
    /// so earlier channels keep their new state.
    pub fn set_all(&mut self, state: RelayState) -> Result<()> {
        for channel in 0..self.channels.len() {
            if let Err(e) = self.set_state(channel, state) {
                warn!(
                    "Setting all relays {} stopped at channel {}: {}",
                    state, channel, e
                );
                return Err(e);
            }
        }
        Ok(())
    }

    /// Energize every channel
    pub fn turn_all_on(&mut self) -> Result<()> {
        self.set_all(RelayState::Energized)
    }

    /// De-energize every channel
    pub fn turn_all_off(&mut self) -> Result<()> {
        self.set_all(RelayState::DeEnergized)
    }

    /// Energize a channel, block for `delay`, then de-energize it
    ///
    /// If energizing fails nothing else happens. The wait cannot be
    /// interrupted.
    pub fn toggle(&mut self, channel: usize, delay: Duration) -> Result<()> {
        self.turn_on(channel)?;
        std::thread::sleep(delay);
        self.turn_off(channel)
    }

    /// Snapshot of the controller and its channels
    pub fn status(&self) -> ControllerStatus {
        ControllerStatus {
            port: self.port.clone(),
            board: self.board.clone(),
            connected: self.is_connected(),
            channels: self.channels.iter().map(ChannelStatus::from).collect(),
        }
    }

    /// Release the transport
    ///
    /// Idempotent. Channel operations afterwards fail with `NotConnected`.
    pub fn close(&mut self) {
        if self.transport.is_open() {
            self.transport.close();
            info!("Relay controller on {} closed", self.port);
        }
    }
}

impl<T: SerialTransport + ?Sized> Drop for RelayController<T> {
    fn drop(&mut self) {
        self.close();
    }
}
