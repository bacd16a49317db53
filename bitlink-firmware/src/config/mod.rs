//! Configuration loading and parsing
//!
//! The link configuration is compiled into the image from link.toml and
//! parsed at boot by a custom no_std parser.

pub mod toml;

pub use toml::{parse_config, FirmwareConfig, ParseError};
