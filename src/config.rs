use serde::Deserialize;

use crate::error::{ParseError, Result, ValidationError};

/// Parameters controlling graph construction and serialization.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphConfig {
    /// Maximum extent of a cell along its split axis, in internal units.
    pub max_segment_length: f64,
    /// Multiplier between internal units and the exchanged text encoding.
    pub scale_factor: u32,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_segment_length: 5.0,
            scale_factor: 1000,
        }
    }
}

impl GraphConfig {
    /// Creates a config with the given split length and scale factor.
    #[must_use]
    pub fn new(max_segment_length: f64, scale_factor: u32) -> Self {
        Self {
            max_segment_length,
            scale_factor,
        }
    }

    /// Parses and validates a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed JSON, or a validation error if a
    /// value is out of range.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(ParseError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable by the pipeline.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` naming the offending field.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !self.max_segment_length.is_finite() || self.max_segment_length <= 0.0 {
            return Err(ValidationError::InvalidConfig(format!(
                "maxSegmentLength must be a positive number, got {}",
                self.max_segment_length
            )));
        }
        if self.scale_factor == 0 {
            return Err(ValidationError::InvalidConfig(
                "scaleFactor must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// The scale factor as a float, for coordinate conversion.
    #[must_use]
    pub fn scale(&self) -> f64 {
        f64::from(self.scale_factor)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::StoreGraphError;

    #[test]
    fn defaults_match_drawing_tool() {
        let config = GraphConfig::default();
        assert!((config.max_segment_length - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.scale_factor, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = GraphConfig::from_json_str(r#"{"maxSegmentLength": 2.5}"#).unwrap();
        assert!((config.max_segment_length - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.scale_factor, 1000);
    }

    #[test]
    fn rejects_non_positive_length() {
        let err = GraphConfig::from_json_str(r#"{"maxSegmentLength": 0}"#).unwrap_err();
        assert!(matches!(
            err,
            StoreGraphError::Validation(ValidationError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_zero_scale() {
        assert!(GraphConfig::new(1.0, 0).validate().is_err());
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = GraphConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, StoreGraphError::Parse(ParseError::Json(_))));
    }
}
