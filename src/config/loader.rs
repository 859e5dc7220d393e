//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading engine
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

use super::types::{EngineConfig, EngineSettings, TaxSchedule};

/// Loads engine configuration from a directory.
///
/// # Directory Structure
///
/// ```text
/// config/default/
/// ├── engine.yaml   # Limits, retirement age, vehicle presets
/// └── tax.yaml      # Progressive brackets and deduction rules
/// ```
///
/// # Example
///
/// ```no_run
/// use roundup_engine::config::ConfigLoader;
/// use roundup_engine::models::InvestmentVehicle;
///
/// let config = ConfigLoader::load("./config/default").unwrap();
/// println!("NPS rate: {}", config.vehicle(InvestmentVehicle::Nps).annual_rate);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns an [`EngineConfig`] on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The ceiling step is not positive
    /// - The tax brackets are empty or not strictly ascending
    /// - A bracket has a negative lower bound or a rate outside `[0, 1]`
    /// - The deduction fraction is outside `[0, 1]` or the cap is negative
    ///
    /// # Example
    ///
    /// ```no_run
    /// use roundup_engine::config::ConfigLoader;
    ///
    /// let config = ConfigLoader::load("./config/default")?;
    /// # Ok::<(), roundup_engine::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<EngineConfig> {
        let path = path.as_ref();

        let engine_path = path.join("engine.yaml");
        let settings = Self::load_yaml::<EngineSettings>(&engine_path)?;
        if settings.limits.ceiling_step <= Decimal::ZERO {
            return Err(EngineError::ConfigParseError {
                path: engine_path.display().to_string(),
                message: "limits.ceiling_step must be positive".to_string(),
            });
        }

        let tax_path = path.join("tax.yaml");
        let tax = Self::load_yaml::<TaxSchedule>(&tax_path)?;
        Self::check_tax_schedule(&tax, &tax_path)?;

        Ok(EngineConfig::new(settings, tax))
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn check_tax_schedule(tax: &TaxSchedule, path: &Path) -> EngineResult<()> {
        let parse_error = |message: &str| EngineError::ConfigParseError {
            path: path.display().to_string(),
            message: message.to_string(),
        };

        if tax.brackets.is_empty() {
            return Err(parse_error("at least one tax bracket is required"));
        }

        let ascending = tax
            .brackets
            .windows(2)
            .all(|pair| pair[0].lower < pair[1].lower);
        if !ascending {
            return Err(parse_error(
                "tax brackets must be sorted by strictly ascending 'lower'",
            ));
        }

        let unit = |value: Decimal| value >= Decimal::ZERO && value <= Decimal::ONE;
        if tax
            .brackets
            .iter()
            .any(|b| b.lower < Decimal::ZERO || !unit(b.rate))
        {
            return Err(parse_error(
                "tax brackets need a non-negative 'lower' and a 'rate' between 0 and 1",
            ));
        }

        if !unit(tax.deduction.wage_fraction) || tax.deduction.cap < Decimal::ZERO {
            return Err(parse_error(
                "deduction needs a 'wage_fraction' between 0 and 1 and a non-negative 'cap'",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvestmentVehicle;
    use std::path::PathBuf;

    fn config_path() -> &'static str {
        "./config/default"
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "roundup_engine_{}_{}",
            name,
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_load_shipped_configuration_matches_defaults() {
        let result = ConfigLoader::load(config_path());
        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

        assert_eq!(result.unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_load_reads_vehicle_rates() {
        let config = ConfigLoader::load(config_path()).unwrap();

        assert_eq!(
            config.vehicle(InvestmentVehicle::Nps).annual_rate.to_string(),
            "0.0711"
        );
        assert_eq!(
            config.vehicle(InvestmentVehicle::Index).annual_rate.to_string(),
            "0.1449"
        );
    }

    #[test]
    fn test_load_missing_directory_returns_error() {
        let result = ConfigLoader::load("/nonexistent/path");

        match result {
            Err(EngineError::ConfigNotFound { path }) => {
                assert!(path.contains("engine.yaml"));
            }
            other => panic!("Expected ConfigNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_invalid_yaml_returns_parse_error() {
        let dir = scratch_dir("invalid_yaml");
        fs::write(dir.join("engine.yaml"), "limits: [not, a, map").unwrap();

        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { path, .. }) => {
                assert!(path.contains("engine.yaml"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_zero_ceiling_step() {
        let dir = scratch_dir("zero_step");
        let engine = fs::read_to_string(Path::new(config_path()).join("engine.yaml")).unwrap();
        fs::write(
            dir.join("engine.yaml"),
            engine.replace("ceiling_step: 100", "ceiling_step: 0"),
        )
        .unwrap();

        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("ceiling_step"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_unsorted_brackets() {
        let dir = scratch_dir("unsorted_brackets");
        fs::copy(
            Path::new(config_path()).join("engine.yaml"),
            dir.join("engine.yaml"),
        )
        .unwrap();
        fs::write(
            dir.join("tax.yaml"),
            "brackets:\n  - { lower: 700000, rate: 0.10 }\n  - { lower: 0, rate: 0 }\n\
             deduction: { wage_fraction: 0.10, cap: 200000 }\n",
        )
        .unwrap();

        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("ascending"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    fn write_scratch_tax(name: &str, tax_yaml: &str) -> PathBuf {
        let dir = scratch_dir(name);
        fs::copy(
            Path::new(config_path()).join("engine.yaml"),
            dir.join("engine.yaml"),
        )
        .unwrap();
        fs::write(dir.join("tax.yaml"), tax_yaml).unwrap();
        dir
    }

    #[test]
    fn test_load_rejects_bracket_rate_above_one() {
        let dir = write_scratch_tax(
            "bracket_rate",
            "brackets:\n  - { lower: 0, rate: 0 }\n  - { lower: 700000, rate: 10 }\n\
             deduction: { wage_fraction: 0.10, cap: 200000 }\n",
        );

        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("'rate' between 0 and 1"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_load_rejects_negative_deduction_cap() {
        let dir = write_scratch_tax(
            "deduction_cap",
            "brackets:\n  - { lower: 0, rate: 0 }\n\
             deduction: { wage_fraction: 0.10, cap: -1 }\n",
        );

        match ConfigLoader::load(&dir) {
            Err(EngineError::ConfigParseError { message, .. }) => {
                assert!(message.contains("non-negative 'cap'"));
            }
            other => panic!("Expected ConfigParseError, got {:?}", other),
        }
    }
}
