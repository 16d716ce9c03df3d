//! TOML-based tariff configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::billing::tariff::{Tariff, TariffStep};

/// One rate block as declared in configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    /// Cumulative cap in kWh; omit for the final, unbounded block.
    #[serde(default)]
    pub upto: Option<f64>,
    /// Energy rate for the block (currency per kWh).
    pub rate: f64,
}

/// Top-level tariff configuration parsed from TOML.
///
/// All fields default to the metropolitan residential schedule for
/// households above 150 kWh/month. Load from TOML with
/// [`TariffConfig::from_toml_file`] or use a built-in preset via
/// [`TariffConfig::from_preset`].
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Ordered rate blocks, ascending caps, final block unbounded.
    pub steps: Vec<StepConfig>,
    /// Flat Ft surcharge per kWh for the billing period.
    pub ft_per_kwh: f64,
    /// Fixed monthly service charge.
    pub service_charge: f64,
    /// VAT rate as a fraction.
    pub vat_rate: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self::mea_residential()
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"steps[2].upto"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl TariffConfig {
    /// Metropolitan residential schedule for households using more than
    /// 150 kWh/month (rate 1.2), the default profile.
    pub fn mea_residential() -> Self {
        Self {
            steps: vec![
                StepConfig {
                    upto: Some(150.0),
                    rate: 3.2484,
                },
                StepConfig {
                    upto: Some(400.0),
                    rate: 4.2218,
                },
                StepConfig {
                    upto: None,
                    rate: 4.4217,
                },
            ],
            ft_per_kwh: 0.1972,
            service_charge: 24.62,
            vat_rate: 0.07,
        }
    }

    /// Metropolitan residential schedule for households using at most
    /// 150 kWh/month (rate 1.1), with its smaller service charge.
    pub fn mea_residential_low_use() -> Self {
        Self {
            steps: vec![
                StepConfig {
                    upto: Some(15.0),
                    rate: 2.3488,
                },
                StepConfig {
                    upto: Some(25.0),
                    rate: 2.9882,
                },
                StepConfig {
                    upto: Some(35.0),
                    rate: 3.2405,
                },
                StepConfig {
                    upto: Some(100.0),
                    rate: 3.6237,
                },
                StepConfig {
                    upto: Some(150.0),
                    rate: 3.7171,
                },
                StepConfig {
                    upto: Some(400.0),
                    rate: 4.2218,
                },
                StepConfig {
                    upto: None,
                    rate: 4.4217,
                },
            ],
            ft_per_kwh: 0.1972,
            service_charge: 8.19,
            vat_rate: 0.07,
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["mea_residential", "mea_residential_low_use"];

    /// Loads a tariff from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "mea_residential" => Ok(Self::mea_residential()),
            "mea_residential_low_use" => Ok(Self::mea_residential_low_use()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a tariff from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "tariff".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a tariff from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Blocks must carry finite non-negative rates and strictly ascending
    /// caps, and only the final block may (and must) be unbounded, so the
    /// schedule covers usage from 0 upward with no gaps or overlaps.
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.steps.is_empty() {
            errors.push(ConfigError {
                field: "steps".into(),
                message: "must contain at least one block".into(),
            });
        }

        let last = self.steps.len().saturating_sub(1);
        let mut prev_cap = 0.0_f64;
        for (i, step) in self.steps.iter().enumerate() {
            if !step.rate.is_finite() || step.rate < 0.0 {
                errors.push(ConfigError {
                    field: format!("steps[{i}].rate"),
                    message: "must be a finite non-negative number".into(),
                });
            }
            match step.upto {
                Some(cap) => {
                    if i == last {
                        errors.push(ConfigError {
                            field: format!("steps[{i}].upto"),
                            message: "final block must be unbounded (omit `upto`)".into(),
                        });
                    }
                    if !cap.is_finite() || cap <= prev_cap {
                        errors.push(ConfigError {
                            field: format!("steps[{i}].upto"),
                            message: format!("must be finite and > {prev_cap}"),
                        });
                    } else {
                        prev_cap = cap;
                    }
                }
                None => {
                    if i != last {
                        errors.push(ConfigError {
                            field: format!("steps[{i}].upto"),
                            message: "only the final block may be unbounded".into(),
                        });
                    }
                }
            }
        }

        if !self.ft_per_kwh.is_finite() || self.ft_per_kwh < 0.0 {
            errors.push(ConfigError {
                field: "ft_per_kwh".into(),
                message: "must be a finite non-negative number".into(),
            });
        }
        if !self.service_charge.is_finite() || self.service_charge < 0.0 {
            errors.push(ConfigError {
                field: "service_charge".into(),
                message: "must be a finite non-negative number".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.vat_rate) {
            errors.push(ConfigError {
                field: "vat_rate".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        errors
    }

    /// Converts the configuration into the runtime tariff passed to the
    /// billing entry points. Call [`TariffConfig::validate`] first.
    pub fn to_tariff(&self) -> Tariff {
        Tariff {
            steps: self
                .steps
                .iter()
                .map(|step| TariffStep {
                    upto: step.upto,
                    rate: step.rate,
                })
                .collect(),
            ft_per_kwh: self.ft_per_kwh,
            service_charge: self.service_charge,
            vat_rate: self.vat_rate,
        }
    }
}
