//! Build script for fischer-arm
//!
//! Validates arm.toml at compile time so a broken embedded wiring table
//! never reaches the Pi.

use std::fs;
use std::path::Path;

const REQUIRED_AXIS_KEYS: [&str; 6] = [
    "name",
    "positive_pin",
    "negative_pin",
    "limit_switch",
    "rotation_sensor",
    "range",
];

fn main() {
    println!("cargo:rerun-if-changed=arm.toml");
    println!("cargo:rerun-if-changed=build.rs");
    validate_config();
}

/// Validate arm.toml structure
fn validate_config() {
    let config_path = Path::new("arm.toml");

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => panic!("\n  ERROR: cannot read arm.toml: {}\n", e),
    };

    let table: toml::Table = match content.parse() {
        Ok(table) => table,
        Err(e) => panic!("\n  ERROR: arm.toml is not valid TOML:\n{}\n", e),
    };

    match table.get("version").and_then(|v| v.as_integer()) {
        Some(1) => {}
        other => panic!("\n  ERROR: arm.toml version must be 1, found {:?}\n", other),
    }

    let axes = match table.get("axis").and_then(|v| v.as_array()) {
        Some(axes) => axes,
        None => panic!("\n  ERROR: arm.toml has no [[axis]] tables\n"),
    };

    if axes.len() != 4 {
        panic!("\n  ERROR: arm.toml needs exactly 4 [[axis]] tables, found {}\n", axes.len());
    }

    for (i, axis) in axes.iter().enumerate() {
        let Some(axis) = axis.as_table() else {
            panic!("\n  ERROR: arm.toml axis #{} is not a table\n", i + 1);
        };
        for key in REQUIRED_AXIS_KEYS {
            if !axis.contains_key(key) {
                panic!("\n  ERROR: arm.toml axis #{} is missing `{}`\n", i + 1, key);
            }
        }
    }
}
