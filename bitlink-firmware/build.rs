//! Build script for bitlink-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates link.toml at compile time

use std::env;
use std::fs;
use std::path::PathBuf;

/// Number of GPIO pins on RP2040
const GPIO_COUNT: i64 = 30;

/// Pins used when link.toml leaves them out
const DEFAULT_TX_PIN: i64 = 5;
const DEFAULT_RX_PIN: i64 = 6;

/// Keys accepted in the [link] section
const LINK_KEYS: [&str; 6] = [
    "half_bit_ms",
    "first_half_extra_ms",
    "sample_correction_ms",
    "idle_gap_bits",
    "tx_pin",
    "rx_pin",
];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate link.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=link.toml");

    let content = fs::read_to_string("link.toml")
        .unwrap_or_else(|e| panic!("\nlink.toml: cannot read file: {}\n", e));
    let config: toml::Value = toml::from_str(&content)
        .unwrap_or_else(|e| panic!("\nlink.toml: invalid TOML\n{}\n", e));

    let errors = validate_link(&config);
    if !errors.is_empty() {
        panic!(
            "\nlink.toml: invalid link configuration\n{}\n",
            errors
                .iter()
                .map(|e| format!("  - {}", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

/// Check the [link] section
fn validate_link(config: &toml::Value) -> Vec<String> {
    let mut errors = Vec::new();

    let link = match config.get("link") {
        Some(toml::Value::Table(t)) => t,
        Some(_) => return vec!["[link] must be a table".to_string()],
        None => return vec!["missing [link] section".to_string()],
    };

    for key in link.keys() {
        if !LINK_KEYS.contains(&key.as_str()) {
            errors.push(format!("[link] unknown key '{}'", key));
        }
    }

    let half_bit_ms = int_at_least(link, "half_bit_ms", 1, 5, &mut errors);
    let first_half_extra_ms = int_at_least(link, "first_half_extra_ms", 0, 1, &mut errors);
    int_at_least(link, "idle_gap_bits", 2, 3, &mut errors);

    match link.get("sample_correction_ms") {
        Some(toml::Value::Integer(correction)) => {
            if let (Some(half), Some(extra)) = (half_bit_ms, first_half_extra_ms) {
                if 2 * half + extra + correction < 1 {
                    errors.push(
                        "[link] sample_correction_ms leaves no time between samples".to_string(),
                    );
                }
            }
        }
        Some(_) => errors.push("[link] sample_correction_ms must be an integer".to_string()),
        None => {}
    }

    let tx_pin = pin_number(link, "tx_pin", DEFAULT_TX_PIN, &mut errors);
    let rx_pin = pin_number(link, "rx_pin", DEFAULT_RX_PIN, &mut errors);
    if let (Some(tx), Some(rx)) = (tx_pin, rx_pin) {
        if tx == rx {
            errors.push(format!("[link] tx_pin and rx_pin both use gpio{}", tx));
        }
    }

    errors
}

/// Integer key with a lower bound; absent keys take `default`
fn int_at_least(
    link: &toml::Table,
    key: &str,
    min: i64,
    default: i64,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match link.get(key) {
        Some(toml::Value::Integer(n)) if *n >= min => Some(*n),
        Some(_) => {
            errors.push(format!("[link] {} must be an integer >= {}", key, min));
            None
        }
        None => Some(default),
    }
}

/// Pin string like "gpio5" or "^gpio6"; absent keys take `default`
fn pin_number(link: &toml::Table, key: &str, default: i64, errors: &mut Vec<String>) -> Option<i64> {
    let value = match link.get(key) {
        Some(toml::Value::String(s)) => s,
        Some(_) => {
            errors.push(format!("[link] {} must be a string", key));
            return None;
        }
        None => return Some(default),
    };

    let trimmed = value.trim();
    let pin = trimmed
        .strip_prefix('^')
        .unwrap_or(trimmed)
        .strip_prefix("gpio")
        .and_then(|n| n.parse::<i64>().ok())
        .filter(|n| (0..GPIO_COUNT).contains(n));

    if pin.is_none() {
        errors.push(format!("[link] {} '{}' is not gpio0-gpio29", key, value));
    }
    pin
}
