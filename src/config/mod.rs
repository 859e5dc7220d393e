//! Configuration loading and management for the savings engine.
//!
//! This module provides functionality to load engine configurations from
//! YAML files: expense limits, the retirement age, investment vehicle
//! presets and the progressive tax schedule.
//!
//! # Example
//!
//! ```no_run
//! use roundup_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Retirement age: {}", config.retirement_age());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DeductionRules, EngineConfig, EngineSettings, Limits, TaxBracket, TaxSchedule, VehicleConfig,
    Vehicles,
};
