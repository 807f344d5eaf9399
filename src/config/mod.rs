//! Configuration module for rulegauge
//!
//! This module handles:
//! - Project-level configuration (rulegauge.toml)
//! - The baseline table and threshold multiplier
//! - Indicator weights and the size function
//! - Semantic analyzer settings

mod project_config;

pub use project_config::{
    ConfigError,
    DiscoveryConfig,
    IndicatorWeights,
    ProjectConfig,
    SemanticConfig,
    SizeConfig,
    ThresholdConfig,
    load_config_file,
    load_project_config,
    load_scoring_config,
    validate_multiplier,
    CONFIG_FILE_NAMES,
};
