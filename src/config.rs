use serde::Deserialize;
use std::path::Path;

use crate::error::SphaError;

pub const FORMATS: [&str; 3] = ["terminal", "json", "html"];

/// All settings that can be placed in a .spha-lens.yml config file.
/// Every field is optional; omitted fields fall back to CLI defaults.
/// CLI flags always take precedence over values set here.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LensConfig {
    /// Cutoff for KPIs that carry no thresholds of their own.
    pub default_threshold: Option<f64>,
    pub format: Option<String>,
    pub output: Option<String>,
    /// Maximum number of critical/warning KPIs listed per product.
    pub top: Option<usize>,
    /// Run result validation and fail on any issue.
    pub strict: Option<bool>,
}

impl LensConfig {
    /// Validates semantic constraints that serde cannot enforce.
    ///
    /// Returns a human-readable error describing exactly what is wrong and what
    /// values are accepted. Called automatically by [`load_config`].
    pub fn validate(&self) -> Result<(), String> {
        if let Some(fmt) = &self.format {
            validate_format(fmt)?;
        }

        // top: 0 would silently hide every warning
        if let Some(0) = self.top {
            return Err("Invalid 'top' value: 0. Must be 1 or greater".to_string());
        }

        if let Some(t) = self.default_threshold {
            validate_threshold(t).map_err(|e| format!("Invalid 'default_threshold': {e}"))?;
        }

        Ok(())
    }
}

pub fn validate_format(format: &str) -> Result<(), String> {
    if FORMATS.contains(&format) {
        Ok(())
    } else {
        Err(format!(
            "Invalid 'format' value: \"{format}\". \
             Expected one of: \"terminal\", \"json\", \"html\""
        ))
    }
}

/// Scores live in 0..=100, so a cutoff outside that range can never be met
/// (or is always met).
pub fn validate_threshold(value: f64) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{value} is not a finite number"));
    }
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("{value} is outside the score range 0..=100"));
    }
    Ok(())
}

/// Reads, parses, and validates a YAML config file from `path`.
pub fn load_config(path: &Path) -> Result<LensConfig, SphaError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SphaError::Config(format!("Cannot read config file '{}': {e}", path.display()))
    })?;
    let cfg: LensConfig = serde_yaml::from_str(&content).map_err(|e| {
        SphaError::Config(format!("Invalid config file '{}': {e}", path.display()))
    })?;
    cfg.validate()
        .map_err(|e| SphaError::Config(format!("Config file '{}': {e}", path.display())))?;
    Ok(cfg)
}

/// Annotated YAML template printed by `--generate-config`.
pub static TEMPLATE: &str = r#"# spha-lens configuration file
# Generated by: spha-lens --generate-config
#
# All settings are optional. Omit any field to use the built-in default.
# CLI flags always take precedence over values in this file.
#
#   spha-lens --config .spha-lens.yml reports/

# ── Analysis ───────────────────────────────────────────────────────────────────

# Cutoff (0-100) for KPIs whose report carries no thresholds of their own.
# default_threshold: 60

# Number of critical/warning KPIs listed per product.
# top: 10

# Validate every report and exit with an error if any value is out of range.
# strict: false

# ── Output ─────────────────────────────────────────────────────────────────────

# Output format: terminal, json, html
# format: "terminal"

# Output file path. For HTML, defaults to ~/Desktop/health-report.html
# output: "health-report.json"
"#;

/// Prints the config template to stdout, or writes it to `output_path` if given.
pub fn print_template(output_path: Option<&Path>) -> Result<(), SphaError> {
    match output_path {
        Some(path) => std::fs::write(path, TEMPLATE).map_err(|e| {
            SphaError::Output(format!("Cannot write config template to '{}': {e}", path.display()))
        }),
        None => {
            print!("{TEMPLATE}");
            Ok(())
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
