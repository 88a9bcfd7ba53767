//! CLI configuration management
//!
//! Handles loading and saving CLI-specific configuration. Serial parameters
//! are fixed by the board and not configurable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest accepted toggle delay (one hour)
pub const MAX_TOGGLE_DELAY_MS: u64 = 3_600_000;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Serial port to use instead of auto-detection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// Default output format
    pub output_format: String,

    /// Enable verbose logging by default
    pub verbose: bool,

    /// Delay between on and off for `toggle`, in milliseconds
    pub toggle_delay_ms: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: None,
            output_format: "table".to_string(),
            verbose: false,
            toggle_delay_ms: 1000,
        }
    }
}

impl CliConfig {
    /// Load configuration from `path`, or defaults if the file does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CLI config file {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse CLI config file {}", path.display()))
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize CLI config")?;

        std::fs::write(path, content).context("Failed to write CLI config file")?;

        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// `~/.config/kmrelay/cli.toml` on Linux, the platform equivalent elsewhere.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("kmrelay").join("cli.toml"))
            .ok_or_else(|| anyhow::anyhow!("Cannot determine config directory"))
    }

    /// Use `explicit` if given, otherwise the default path
    pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => Ok(path.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Create a new builder for constructing configuration
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for CLI configuration with validation and priority chain support
///
/// Priority chain (lowest to highest):
/// 1. Defaults
/// 2. Config file
/// 3. Environment variables
/// 4. CLI arguments
///
/// Apply sources highest priority first; a value already set is never
/// overwritten by a lower-priority source.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    port: Option<String>,
    output_format: Option<String>,
    verbose: Option<bool>,
    toggle_delay_ms: Option<u64>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set serial port (with validation)
    pub fn with_port(mut self, port: impl Into<String>) -> Result<Self> {
        let port = port.into();
        Self::validate_port(&port)?;
        self.port = Some(port);
        Ok(self)
    }

    /// Set output format (with validation)
    pub fn with_output_format(mut self, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        Self::validate_output_format(&format)?;
        self.output_format = Some(format);
        Ok(self)
    }

    /// Set verbose flag
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Set toggle delay (with validation)
    pub fn with_toggle_delay_ms(mut self, delay_ms: u64) -> Result<Self> {
        Self::validate_toggle_delay(delay_ms)?;
        self.toggle_delay_ms = Some(delay_ms);
        Ok(self)
    }

    /// Fill unset values from a config file
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn with_config_file(self, path: &Path) -> Result<Self> {
        let config = CliConfig::load_from(path)?;

        // Only use file values if they weren't already set (preserving priority)
        Ok(Self {
            port: self.port.or(config.port),
            output_format: self.output_format.or(Some(config.output_format)),
            verbose: self.verbose.or(Some(config.verbose)),
            toggle_delay_ms: self.toggle_delay_ms.or(Some(config.toggle_delay_ms)),
        })
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        // Only apply env vars if values weren't already set (preserving priority)
        if self.port.is_none() {
            if let Ok(port) = std::env::var("KMRELAY_PORT") {
                if Self::validate_port(&port).is_ok() {
                    self.port = Some(port);
                }
            }
        }

        if self.output_format.is_none() {
            if let Ok(format) = std::env::var("KMRELAY_FORMAT") {
                if Self::validate_output_format(&format).is_ok() {
                    self.output_format = Some(format);
                }
            }
        }

        if self.verbose.is_none() {
            if let Ok(verbose) = std::env::var("KMRELAY_VERBOSE") {
                self.verbose = Some(verbose.to_lowercase() == "true" || verbose == "1");
            }
        }

        if self.toggle_delay_ms.is_none() {
            if let Ok(delay) = std::env::var("KMRELAY_TOGGLE_DELAY_MS") {
                if let Ok(delay) = delay.parse() {
                    if Self::validate_toggle_delay(delay).is_ok() {
                        self.toggle_delay_ms = Some(delay);
                    }
                }
            }
        }

        self
    }

    /// Build the final configuration with validation
    pub fn build(self) -> Result<CliConfig> {
        let defaults = CliConfig::default();

        let port = self.port.or(defaults.port);
        let output_format = self.output_format.unwrap_or(defaults.output_format);
        let toggle_delay_ms = self.toggle_delay_ms.unwrap_or(defaults.toggle_delay_ms);

        // Validate final values
        if let Some(ref port) = port {
            Self::validate_port(port)?;
        }
        Self::validate_output_format(&output_format)?;
        Self::validate_toggle_delay(toggle_delay_ms)?;

        Ok(CliConfig {
            port,
            output_format,
            verbose: self.verbose.unwrap_or(defaults.verbose),
            toggle_delay_ms,
        })
    }

    /// Validate serial port path
    fn validate_port(port: &str) -> Result<()> {
        if port.trim().is_empty() {
            return Err(anyhow::anyhow!("Serial port cannot be empty"));
        }
        Ok(())
    }

    /// Validate output format
    fn validate_output_format(format: &str) -> Result<()> {
        match format {
            "table" | "json" => Ok(()),
            _ => Err(anyhow::anyhow!(
                "Invalid output format '{}'. Must be 'table' or 'json'",
                format
            )),
        }
    }

    /// Validate toggle delay
    fn validate_toggle_delay(delay_ms: u64) -> Result<()> {
        if delay_ms > MAX_TOGGLE_DELAY_MS {
            return Err(anyhow::anyhow!(
                "Toggle delay must be less than or equal to {} ms",
                MAX_TOGGLE_DELAY_MS
            ));
        }
        Ok(())
    }
}
