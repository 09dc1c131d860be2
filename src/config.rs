//! Configuration for the preprocessing pipeline.
//!
//! Uses the builder pattern for ergonomic setup. Note the asymmetric
//! 15th/85th percentile defaults for outlier bounds, which trim more
//! aggressively than a classic 25/75 IQR fence.

use serde::{Deserialize, Serialize};

/// Configuration for the preprocessing pipeline.
///
/// Use [`PipelineConfig::builder()`] for a fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use tabular_prep::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .lower_quantile(0.15)
///     .upper_quantile(0.85)
///     .iqr_factor(1.5)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Lower quantile used for outlier bounds.
    /// Default: 0.15
    pub lower_quantile: f64,

    /// Upper quantile used for outlier bounds.
    /// Default: 0.85
    pub upper_quantile: f64,

    /// Multiplier applied to the inter-quantile range when computing outlier
    /// bounds. Default: 1.5
    pub iqr_factor: f64,

    /// A numeric column whose distinct/row-count ratio falls below this
    /// threshold is classified categorical. Default: 0.05
    pub categorical_ratio_threshold: f64,

    /// Maximum distinct values for a target column to be treated as a
    /// classification target (never normalized). Default: 50
    pub target_class_max_cardinality: usize,

    /// Maximum distinct values for the small-range-integer categorical rule.
    /// Default: 20
    pub small_int_max_cardinality: usize,

    /// Upper bound on messages persisted to a record's `error_message`.
    /// Default: 500 characters
    pub error_message_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lower_quantile: 0.15,
            upper_quantile: 0.85,
            iqr_factor: 1.5,
            categorical_ratio_threshold: 0.05,
            target_class_max_cardinality: 50,
            small_int_max_cardinality: 20,
            error_message_limit: crate::error::DEFAULT_ERROR_MESSAGE_LIMIT,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        for (field, value) in [
            ("lower_quantile", self.lower_quantile),
            ("upper_quantile", self.upper_quantile),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigValidationError::InvalidQuantile {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if self.lower_quantile >= self.upper_quantile {
            return Err(ConfigValidationError::QuantileOrder {
                lower: self.lower_quantile,
                upper: self.upper_quantile,
            });
        }

        if self.iqr_factor <= 0.0 {
            return Err(ConfigValidationError::InvalidIqrFactor(self.iqr_factor));
        }

        if !(0.0..=1.0).contains(&self.categorical_ratio_threshold) {
            return Err(ConfigValidationError::InvalidQuantile {
                field: "categorical_ratio_threshold".to_string(),
                value: self.categorical_ratio_threshold,
            });
        }

        if self.error_message_limit == 0 {
            return Err(ConfigValidationError::InvalidErrorMessageLimit);
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("invalid quantile for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidQuantile { field: String, value: f64 },

    #[error("lower quantile {lower} must be below upper quantile {upper}")]
    QuantileOrder { lower: f64, upper: f64 },

    #[error("invalid IQR factor: {0} (must be positive)")]
    InvalidIqrFactor(f64),

    #[error("error message limit must be at least 1")]
    InvalidErrorMessageLimit,
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    lower_quantile: Option<f64>,
    upper_quantile: Option<f64>,
    iqr_factor: Option<f64>,
    categorical_ratio_threshold: Option<f64>,
    target_class_max_cardinality: Option<usize>,
    small_int_max_cardinality: Option<usize>,
    error_message_limit: Option<usize>,
}

impl PipelineConfigBuilder {
    /// Set the lower quantile for outlier bounds.
    pub fn lower_quantile(mut self, q: f64) -> Self {
        self.lower_quantile = Some(q);
        self
    }

    /// Set the upper quantile for outlier bounds.
    pub fn upper_quantile(mut self, q: f64) -> Self {
        self.upper_quantile = Some(q);
        self
    }

    /// Set the inter-quantile range multiplier.
    pub fn iqr_factor(mut self, factor: f64) -> Self {
        self.iqr_factor = Some(factor);
        self
    }

    /// Set the distinct/row-count ratio below which numeric columns are
    /// classified categorical.
    pub fn categorical_ratio_threshold(mut self, threshold: f64) -> Self {
        self.categorical_ratio_threshold = Some(threshold);
        self
    }

    /// Set the maximum cardinality for a target column to be treated as a
    /// classification target.
    pub fn target_class_max_cardinality(mut self, max: usize) -> Self {
        self.target_class_max_cardinality = Some(max);
        self
    }

    /// Set the maximum cardinality for the small-range-integer rule.
    pub fn small_int_max_cardinality(mut self, max: usize) -> Self {
        self.small_int_max_cardinality = Some(max);
        self
    }

    /// Set the upper bound for persisted error messages.
    pub fn error_message_limit(mut self, limit: usize) -> Self {
        self.error_message_limit = Some(limit);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            lower_quantile: self.lower_quantile.unwrap_or(defaults.lower_quantile),
            upper_quantile: self.upper_quantile.unwrap_or(defaults.upper_quantile),
            iqr_factor: self.iqr_factor.unwrap_or(defaults.iqr_factor),
            categorical_ratio_threshold: self
                .categorical_ratio_threshold
                .unwrap_or(defaults.categorical_ratio_threshold),
            target_class_max_cardinality: self
                .target_class_max_cardinality
                .unwrap_or(defaults.target_class_max_cardinality),
            small_int_max_cardinality: self
                .small_int_max_cardinality
                .unwrap_or(defaults.small_int_max_cardinality),
            error_message_limit: self.error_message_limit.unwrap_or(defaults.error_message_limit),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.lower_quantile, 0.15);
        assert_eq!(config.upper_quantile, 0.85);
        assert_eq!(config.iqr_factor, 1.5);
        assert_eq!(config.categorical_ratio_threshold, 0.05);
        assert_eq!(config.target_class_max_cardinality, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_custom_values() {
        let config = PipelineConfig::builder()
            .lower_quantile(0.25)
            .upper_quantile(0.75)
            .iqr_factor(3.0)
            .build()
            .unwrap();

        assert_eq!(config.lower_quantile, 0.25);
        assert_eq!(config.upper_quantile, 0.75);
        assert_eq!(config.iqr_factor, 3.0);
    }

    #[test]
    fn test_validation_quantile_out_of_range() {
        let result = PipelineConfig::builder().upper_quantile(1.5).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidQuantile { .. }
        ));
    }

    #[test]
    fn test_validation_quantile_order() {
        let result = PipelineConfig::builder()
            .lower_quantile(0.9)
            .upper_quantile(0.1)
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::QuantileOrder { .. }
        ));
    }

    #[test]
    fn test_validation_iqr_factor() {
        let result = PipelineConfig::builder().iqr_factor(0.0).build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidIqrFactor(_)
        ));
    }

    #[test]
    fn test_config_serialization_round_trip() {
        let config = PipelineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config.lower_quantile, deserialized.lower_quantile);
        assert_eq!(config.upper_quantile, deserialized.upper_quantile);
        assert_eq!(config.error_message_limit, deserialized.error_message_limit);
    }
}
