//! Simple TOML parser for link configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! link.toml. It does NOT support full TOML syntax.
//!
//! Supported features:
//! - Key = value pairs (string, integer)
//! - [section] headers
//! - Comments (# ...)
//!
//! The file is already checked by `build.rs` with a full TOML parser, so
//! this only needs to be strict enough to catch hand-edited images.

use bitlink_core::LinkConfig;
use bitlink_hal_rp2040::{parse_pin_string, PinSpec};

/// Default transmit pin
const DEFAULT_TX_PIN: u8 = 5;

/// Default receive pin
const DEFAULT_RX_PIN: u8 = 6;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Unknown key in a known section
    UnknownKey,
    /// Invalid value type
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
}

/// Complete firmware configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FirmwareConfig {
    /// Link timing
    pub link: LinkConfig,
    /// Transmit line
    pub tx_pin: PinSpec,
    /// Receive line
    pub rx_pin: PinSpec,
}

impl Default for FirmwareConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            tx_pin: PinSpec {
                pin: DEFAULT_TX_PIN,
                pull_up: false,
            },
            rx_pin: PinSpec {
                pin: DEFAULT_RX_PIN,
                pull_up: false,
            },
        }
    }
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Link,
}

/// Parse TOML configuration into FirmwareConfig
///
/// Keys that are absent keep their default value.
pub fn parse_config(input: &str) -> Result<FirmwareConfig, ParseError> {
    let mut config = FirmwareConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidValue)?;
        match section {
            Section::Root => return Err(ParseError::InvalidSection),
            Section::Link => apply_link_key(&mut config, key, value)?,
        }
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "link" => Ok(Section::Link),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_link_key(config: &mut FirmwareConfig, key: &str, value: &str) -> Result<(), ParseError> {
    match key {
        "half_bit_ms" => config.link.half_bit_ms = parse_int(value)?,
        "first_half_extra_ms" => config.link.first_half_extra_ms = parse_int(value)?,
        "sample_correction_ms" => config.link.sample_correction_ms = parse_int(value)?,
        "idle_gap_bits" => config.link.idle_gap_bits = parse_int(value)?,
        "tx_pin" => config.tx_pin = parse_pin(value)?,
        "rx_pin" => config.rx_pin = parse_pin(value)?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Remove inline comments
    let value = if let Some(hash_pos) = value.find('#') {
        // Make sure # is not inside a string
        let quote_count = value[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            value[..hash_pos].trim()
        } else {
            value
        }
    } else {
        value
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a pin string like "gpio5" or "^gpio6"
fn parse_pin(value: &str) -> Result<PinSpec, ParseError> {
    parse_pin_string(parse_string(value)).ok_or(ParseError::InvalidPin)
}
