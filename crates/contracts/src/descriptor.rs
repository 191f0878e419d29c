//! Descriptors - declarative sensor and noise configuration
//!
//! These are the shapes consumed by the noise factory and by `Sensor::load`.
//! Where they come from (TOML, JSON, code) is the caller's concern.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use validator::Validate;

use crate::{ContractError, NoiseType};

/// 噪声描述
///
/// Field names are the stable contract (`type`, `mean`, `stddev`,
/// `bias_mean`, `bias_stddev`, `precision`). The type is kept as a string so
/// that unknown values reach the noise factory and are rejected there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NoiseDescriptor {
    /// Variant selector: `none`, `gaussian`, `gaussian_quantized`
    #[serde(rename = "type", default = "default_noise_type")]
    pub noise_type: String,

    /// Mean of the per-call Gaussian sample
    #[serde(default)]
    pub mean: f64,

    /// Standard deviation of the per-call Gaussian sample
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub stddev: f64,

    /// Mean of the one-time bias draw
    #[serde(default)]
    pub bias_mean: f64,

    /// Standard deviation of the one-time bias draw
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub bias_stddev: f64,

    /// Quantization step, only used by `gaussian_quantized`
    #[serde(default)]
    pub precision: f64,
}

fn default_noise_type() -> String {
    NoiseType::None.as_str().to_string()
}

impl NoiseDescriptor {
    /// Pass-through noise
    pub fn none() -> Self {
        Self::gaussian(0.0, 0.0, 0.0, 0.0).with_type(NoiseType::None)
    }

    /// Gaussian noise with a fixed bias drawn once
    pub fn gaussian(mean: f64, stddev: f64, bias_mean: f64, bias_stddev: f64) -> Self {
        Self {
            noise_type: NoiseType::Gaussian.as_str().to_string(),
            mean,
            stddev,
            bias_mean,
            bias_stddev,
            precision: 0.0,
        }
    }

    /// Gaussian noise rounded to multiples of `precision`
    pub fn gaussian_quantized(
        mean: f64,
        stddev: f64,
        bias_mean: f64,
        bias_stddev: f64,
        precision: f64,
    ) -> Self {
        Self {
            precision,
            ..Self::gaussian(mean, stddev, bias_mean, bias_stddev)
                .with_type(NoiseType::GaussianQuantized)
        }
    }

    /// Replace the type selector
    pub fn with_type(mut self, noise_type: NoiseType) -> Self {
        self.noise_type = noise_type.as_str().to_string();
        self
    }

    /// Parse the type selector
    pub fn parsed_type(&self) -> Result<NoiseType, ContractError> {
        self.noise_type.parse()
    }
}

impl Default for NoiseDescriptor {
    fn default() -> Self {
        Self::none()
    }
}

/// 传感器类型
///
/// Altimeter and air pressure sensors are implemented in this workspace; the
/// rendering backed kinds are recognised so that descriptors naming them can
/// be routed to an external implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Altimeter,
    AirPressure,
    Camera,
    DepthCamera,
    RgbdCamera,
    GpuLidar,
}

impl SensorKind {
    /// Descriptor spelling of the kind
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Altimeter => "altimeter",
            Self::AirPressure => "air_pressure",
            Self::Camera => "camera",
            Self::DepthCamera => "depth_camera",
            Self::RgbdCamera => "rgbd_camera",
            Self::GpuLidar => "gpu_lidar",
        }
    }

    /// Whether producing data for this kind needs a rendering engine
    pub const fn requires_rendering(self) -> bool {
        matches!(
            self,
            Self::Camera | Self::DepthCamera | Self::RgbdCamera | Self::GpuLidar
        )
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 传感器描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SensorDescriptor {
    /// Sensor name, unique within one simulation document
    #[validate(length(min = 1))]
    pub name: String,

    /// Kind discriminator
    #[serde(rename = "type")]
    pub kind: SensorKind,

    /// Publishing topic; derived from name and kind when absent
    #[serde(default)]
    pub topic: Option<String>,

    /// Update rate (Hz), 0 = every tick
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub update_rate: f64,

    /// Optional noise applied to the produced measurement
    #[serde(default)]
    #[validate(nested)]
    pub noise: Option<NoiseDescriptor>,

    /// Kind specific attributes
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl SensorDescriptor {
    /// Descriptor with defaults for everything but name and kind
    pub fn new(name: impl Into<String>, kind: SensorKind) -> Self {
        Self {
            name: name.into(),
            kind,
            topic: None,
            update_rate: 0.0,
            noise: None,
            attributes: HashMap::new(),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn with_update_rate(mut self, rate_hz: f64) -> Self {
        self.update_rate = rate_hz;
        self
    }

    pub fn with_noise(mut self, noise: NoiseDescriptor) -> Self {
        self.noise = Some(noise);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(key.into(), value.to_string());
        self
    }

    /// Read a numeric attribute, `Ok(None)` when it is absent
    pub fn attribute_f64(&self, key: &str) -> Result<Option<f64>, ContractError> {
        let Some(raw) = self.attributes.get(key) else {
            return Ok(None);
        };
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|e| ContractError::invalid_attribute(key, raw, format!("{e}")))?;
        if !value.is_finite() {
            return Err(ContractError::invalid_attribute(
                key,
                raw,
                "value must be finite",
            ));
        }
        Ok(Some(value))
    }

    /// Read a numeric attribute, falling back to `default` when absent
    pub fn attribute_f64_or(&self, key: &str, default: f64) -> Result<f64, ContractError> {
        Ok(self.attribute_f64(key)?.unwrap_or(default))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_descriptor_defaults() {
        let noise: NoiseDescriptor = serde_json::from_str(r#"{ "stddev": 0.5 }"#).unwrap();
        assert_eq!(noise.noise_type, "none");
        assert_eq!(noise.stddev, 0.5);
        assert_eq!(noise.mean, 0.0);
        assert_eq!(noise.precision, 0.0);
    }

    #[test]
    fn test_noise_descriptor_keeps_unknown_type() {
        let noise: NoiseDescriptor = serde_json::from_str(r#"{ "type": "perlin" }"#).unwrap();
        assert_eq!(noise.noise_type, "perlin");
        assert!(noise.parsed_type().is_err());
    }

    #[test]
    fn test_quantized_builder_keeps_precision() {
        let noise = NoiseDescriptor::gaussian_quantized(1.0, 2.0, 3.0, 4.0, 0.3);
        assert_eq!(noise.parsed_type().unwrap(), NoiseType::GaussianQuantized);
        assert_eq!(noise.precision, 0.3);
        assert_eq!(noise.bias_stddev, 4.0);
    }

    #[test]
    fn test_noise_validation_rejects_negative_stddev() {
        let noise = NoiseDescriptor::gaussian(0.0, -1.0, 0.0, 0.0);
        assert!(noise.validate().is_err());
        assert!(NoiseDescriptor::gaussian(0.0, 1.0, 0.0, 2.0).validate().is_ok());
    }

    #[test]
    fn test_sensor_descriptor_json() {
        let content = r#"{
            "name": "alt",
            "type": "altimeter",
            "update_rate": 20.0,
            "noise": { "type": "gaussian", "stddev": 0.1 },
            "attributes": { "vertical_reference": "12.5" }
        }"#;
        let descriptor: SensorDescriptor = serde_json::from_str(content).unwrap();
        assert_eq!(descriptor.kind, SensorKind::Altimeter);
        assert_eq!(descriptor.topic, None);
        assert_eq!(descriptor.update_rate, 20.0);
        assert_eq!(
            descriptor.attribute_f64("vertical_reference").unwrap(),
            Some(12.5)
        );
        assert!(descriptor.validate().is_ok());
    }

    #[test]
    fn test_sensor_descriptor_validation() {
        let descriptor = SensorDescriptor::new("", SensorKind::AirPressure);
        assert!(descriptor.validate().is_err());

        let descriptor = SensorDescriptor::new("baro", SensorKind::AirPressure).with_update_rate(-1.0);
        assert!(descriptor.validate().is_err());
    }

    #[test]
    fn test_attribute_parse_errors() {
        let descriptor = SensorDescriptor::new("alt", SensorKind::Altimeter)
            .with_attribute("vertical_reference", "high")
            .with_attribute("altitude_offset", "inf");
        assert!(descriptor.attribute_f64("vertical_reference").is_err());
        assert!(descriptor.attribute_f64("altitude_offset").is_err());
        assert_eq!(descriptor.attribute_f64("missing").unwrap(), None);
        assert_eq!(descriptor.attribute_f64_or("missing", 3.0).unwrap(), 3.0);
    }

    #[test]
    fn test_kind_spelling() {
        assert_eq!(SensorKind::AirPressure.to_string(), "air_pressure");
        assert!(SensorKind::RgbdCamera.requires_rendering());
        assert!(!SensorKind::Altimeter.requires_rendering());
        let kind: SensorKind = serde_json::from_str("\"gpu_lidar\"").unwrap();
        assert_eq!(kind, SensorKind::GpuLidar);
    }
}
