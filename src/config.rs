//! Link configuration parameters
//!
//! All tunable parameters for the two controller boards: which serial line
//! each one is on, how long a read may wait, the protocol settle delays and
//! the polling cadence.  Defaults match the boards' firmware timing.
//! Values can be overridden from a JSON file.

use core::fmt;
use core::time::Duration;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::device::climate::ClimateTiming;
use crate::device::shading::ShadingTiming;
use crate::link::transport::ReadTiming;

/// Upper bound for any single protocol delay.  Anything longer would stall
/// a poll cycle past the next scheduled tick.
const MAX_DELAY_MS: u32 = 1000;

// ───────────────────────────────────────────────────────────────
// Serial line
// ───────────────────────────────────────────────────────────────

/// One physical serial line and its read policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortConfig {
    /// Whether the binary should open a session on this line.
    pub enabled: bool,
    /// OS port name, e.g. `/dev/ttyUSB0` or `COM3`.
    pub port: String,
    /// Line speed (8N1, no flow control).
    pub baud_rate: u32,
    /// Bounded wait for a single response byte (milliseconds).
    pub read_timeout_ms: u32,
    /// Polling step inside the bounded wait (milliseconds).
    pub poll_step_ms: u32,
    /// Interval between two `update()` calls (milliseconds).
    pub poll_interval_ms: u32,
}

impl Default for PortConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: String::from("/dev/ttyUSB0"),
            baud_rate: 9600,
            read_timeout_ms: 500,
            poll_step_ms: 10,
            poll_interval_ms: 1000,
        }
    }
}

/// A `line` object as written in a file: every field optional, merged over
/// the owning board's defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PortOverrides {
    enabled: Option<bool>,
    port: Option<String>,
    baud_rate: Option<u32>,
    read_timeout_ms: Option<u32>,
    poll_step_ms: Option<u32>,
    poll_interval_ms: Option<u32>,
}

impl PortOverrides {
    fn apply(self, base: PortConfig) -> PortConfig {
        PortConfig {
            enabled: self.enabled.unwrap_or(base.enabled),
            port: self.port.unwrap_or(base.port),
            baud_rate: self.baud_rate.unwrap_or(base.baud_rate),
            read_timeout_ms: self.read_timeout_ms.unwrap_or(base.read_timeout_ms),
            poll_step_ms: self.poll_step_ms.unwrap_or(base.poll_step_ms),
            poll_interval_ms: self.poll_interval_ms.unwrap_or(base.poll_interval_ms),
        }
    }
}

fn climate_line<'de, D: Deserializer<'de>>(d: D) -> Result<PortConfig, D::Error> {
    PortOverrides::deserialize(d).map(|o| o.apply(ClimateConfig::default_line()))
}

fn shading_line<'de, D: Deserializer<'de>>(d: D) -> Result<PortConfig, D::Error> {
    PortOverrides::deserialize(d).map(|o| o.apply(ShadingConfig::default_line()))
}

impl PortConfig {
    pub fn read_timing(&self) -> ReadTiming {
        ReadTiming {
            poll_step: Duration::from_millis(self.poll_step_ms.into()),
            timeout: Duration::from_millis(self.read_timeout_ms.into()),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.port.trim().is_empty() {
            return Err(ConfigError::ValidationFailed("port name is empty"));
        }
        if self.baud_rate == 0 {
            return Err(ConfigError::ValidationFailed("baud_rate must be > 0"));
        }
        if self.poll_step_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll_step_ms must be > 0"));
        }
        if self.poll_step_ms > self.read_timeout_ms {
            return Err(ConfigError::ValidationFailed(
                "poll_step_ms must not exceed read_timeout_ms",
            ));
        }
        if self.read_timeout_ms > MAX_DELAY_MS {
            return Err(ConfigError::ValidationFailed("read_timeout_ms above 1000"));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("poll_interval_ms must be > 0"));
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Boards
// ───────────────────────────────────────────────────────────────

/// Climate board (air conditioner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    #[serde(deserialize_with = "climate_line")]
    pub line: PortConfig,
    /// Gap between the integer and fractional setpoint packets.
    pub packet_settle_ms: u32,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            line: Self::default_line(),
            packet_settle_ms: 40,
        }
    }
}

impl ClimateConfig {
    fn default_line() -> PortConfig {
        PortConfig {
            poll_interval_ms: 700,
            ..PortConfig::default()
        }
    }

    pub fn timing(&self) -> ClimateTiming {
        ClimateTiming {
            packet_settle: Duration::from_millis(self.packet_settle_ms.into()),
        }
    }
}

/// Shading board (curtain controller).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadingConfig {
    #[serde(deserialize_with = "shading_line")]
    pub line: PortConfig,
    /// Gap between the integer and fractional position packets.
    pub packet_settle_ms: u32,
    /// Quiet time before every read request except the first of a cycle.
    pub exchange_gap_ms: u32,
    /// Wait between a read request and collecting its response.
    pub response_settle_ms: u32,
}

impl Default for ShadingConfig {
    fn default() -> Self {
        Self {
            line: Self::default_line(),
            packet_settle_ms: 20,
            exchange_gap_ms: 20,
            response_settle_ms: 30,
        }
    }
}

impl ShadingConfig {
    fn default_line() -> PortConfig {
        PortConfig {
            port: String::from("/dev/ttyUSB1"),
            read_timeout_ms: 200,
            poll_interval_ms: 900,
            ..PortConfig::default()
        }
    }

    pub fn timing(&self) -> ShadingTiming {
        ShadingTiming {
            packet_settle: Duration::from_millis(self.packet_settle_ms.into()),
            exchange_gap: Duration::from_millis(self.exchange_gap_ms.into()),
            response_settle: Duration::from_millis(self.response_settle_ms.into()),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Top level
// ───────────────────────────────────────────────────────────────

/// Core link configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    pub climate: ClimateConfig,
    pub shading: ShadingConfig,
}

impl LinkConfig {
    /// Parse and validate a JSON document.  Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Corrupted(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.as_ref().display())))?;
        Ok(Self::from_json_str(&text)?)
    }

    /// Reject out-of-range values.  Nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.climate.line.validate()?;
        self.shading.line.validate()?;

        if self.climate.packet_settle_ms > MAX_DELAY_MS
            || self.shading.packet_settle_ms > MAX_DELAY_MS
        {
            return Err(ConfigError::ValidationFailed("packet_settle_ms above 1000"));
        }
        if self.shading.exchange_gap_ms > MAX_DELAY_MS
            || self.shading.response_settle_ms > MAX_DELAY_MS
        {
            return Err(ConfigError::ValidationFailed("shading exchange delays above 1000"));
        }
        if self.climate.line.enabled
            && self.shading.line.enabled
            && self.climate.line.port == self.shading.line.port
        {
            return Err(ConfigError::ValidationFailed(
                "climate and shading boards cannot share a serial line",
            ));
        }
        Ok(())
    }
}

// ───────────────────────────────────────────────────────────────
// Error type
// ───────────────────────────────────────────────────────────────

/// Errors from loading or validating a [`LinkConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file could not be read.
    Io(String),
    /// The document is not valid JSON for this schema.
    Corrupted(String),
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "cannot read config: {msg}"),
            Self::Corrupted(msg) => write!(f, "config corrupted: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
