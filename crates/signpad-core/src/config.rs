//! Editor configuration

use crate::error::{Result, SignpadError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Smallest display zoom factor
    pub min_scale: f64,
    /// Largest display zoom factor
    pub max_scale: f64,
    /// Increment used by zoom in / zoom out
    pub scale_step: f64,
    /// Zoom factor applied when a document is loaded
    pub default_scale: f64,
    /// Width in document units given to new text annotations
    pub annotation_width: f64,
    /// Width in document units given to new signatures
    pub signature_width: f64,
    /// Font size used when text annotations are written to the PDF
    pub font_size: f64,
    /// Reject items whose page does not exist in the loaded document
    pub validate_pages: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.6,
            max_scale: 3.0,
            scale_step: 0.2,
            default_scale: 1.0,
            annotation_width: 200.0,
            signature_width: 200.0,
            font_size: 12.0,
            validate_pages: true,
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SignpadError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("min_scale", self.min_scale),
            ("max_scale", self.max_scale),
            ("scale_step", self.scale_step),
            ("annotation_width", self.annotation_width),
            ("signature_width", self.signature_width),
            ("font_size", self.font_size),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(SignpadError::Config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if self.min_scale > self.max_scale {
            return Err(SignpadError::Config(format!(
                "min_scale {} exceeds max_scale {}",
                self.min_scale, self.max_scale
            )));
        }
        if !(self.min_scale..=self.max_scale).contains(&self.default_scale) {
            return Err(SignpadError::Config(format!(
                "default_scale {} is outside {}..={}",
                self.default_scale, self.min_scale, self.max_scale
            )));
        }
        Ok(())
    }

    /// Clamp `scale` into the configured zoom range.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        scale.clamp(self.min_scale, self.max_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EditorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{"max_scale": 4.0}"#).unwrap();
        assert_eq!(config.max_scale, 4.0);
        assert_eq!(config.min_scale, 0.6);
        assert!(config.validate_pages);
    }

    #[test]
    fn test_rejects_inverted_range() {
        let err = EditorConfig::from_json(r#"{"min_scale": 2.0, "max_scale": 1.0}"#).unwrap_err();
        assert!(matches!(err, SignpadError::Config(_)));
    }

    #[test]
    fn test_rejects_non_positive_step() {
        let err = EditorConfig::from_json(r#"{"scale_step": 0}"#).unwrap_err();
        assert!(matches!(err, SignpadError::Config(_)));
    }

    #[test]
    fn test_clamp_scale() {
        let config = EditorConfig::default();
        assert_eq!(config.clamp_scale(10.0), 3.0);
        assert_eq!(config.clamp_scale(0.1), 0.6);
        assert_eq!(config.clamp_scale(1.4), 1.4);
    }
}
