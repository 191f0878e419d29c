//! Gaussian noise with a per-instance bias and optional quantization.

use std::fmt;

use contracts::{NoiseDescriptor, NoiseType};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{NoiseError, Result};

/// Parameters of a Gaussian noise model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GaussianParams {
    pub mean: f64,
    pub std_dev: f64,
    pub bias_mean: f64,
    pub bias_std_dev: f64,
    /// Quantization step; ignored unless the model is quantized
    pub precision: f64,
}

impl GaussianParams {
    /// Reject parameters that cannot describe a normal distribution.
    pub fn validate(&self) -> Result<()> {
        check_finite("mean", self.mean)?;
        check_std_dev("stddev", self.std_dev)?;
        check_finite("bias_mean", self.bias_mean)?;
        check_std_dev("bias_stddev", self.bias_std_dev)?;
        check_finite("precision", self.precision)?;
        Ok(())
    }
}

impl From<&NoiseDescriptor> for GaussianParams {
    fn from(descriptor: &NoiseDescriptor) -> Self {
        Self {
            mean: descriptor.mean,
            std_dev: descriptor.stddev,
            bias_mean: descriptor.bias_mean,
            bias_std_dev: descriptor.bias_stddev,
            precision: descriptor.precision,
        }
    }
}

fn check_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(NoiseError::invalid(name, value, "must be finite"))
    }
}

fn check_std_dev(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(NoiseError::invalid(name, value, "must be finite and >= 0"))
    }
}

/// Gaussian noise model.
///
/// `apply(x) = x + N(mean, std_dev) + bias`, where `bias` is drawn once from
/// `N(bias_mean, bias_std_dev)` when the model is built. When `quantized` and
/// `precision > 0`, the result is rounded to the nearest multiple of
/// `precision` (halfway cases away from zero).
#[derive(Debug, Clone)]
pub struct GaussianNoiseModel {
    params: GaussianParams,
    quantized: bool,
    bias: f64,
    /// `None` when `std_dev == 0`; the sample is then exactly `mean`
    sample: Option<Normal<f64>>,
    rng: ChaCha8Rng,
}

impl GaussianNoiseModel {
    /// Build a model, drawing its bias from `rng`.
    ///
    /// `rng` becomes the model's private stream for per-call samples.
    ///
    /// # Errors
    ///
    /// [`NoiseError::InvalidParameter`] for negative or non-finite standard
    /// deviations and non-finite means/precision.
    pub fn new(params: GaussianParams, quantized: bool, mut rng: ChaCha8Rng) -> Result<Self> {
        params.validate()?;

        let bias = draw(params.bias_mean, params.bias_std_dev, "bias_stddev", &mut rng)?;
        let sample = if params.std_dev > 0.0 {
            Some(
                Normal::new(params.mean, params.std_dev)
                    .map_err(|_| NoiseError::invalid("stddev", params.std_dev, "rejected by normal distribution"))?,
            )
        } else {
            None
        };

        Ok(Self {
            params,
            quantized,
            bias,
            sample,
            rng,
        })
    }

    pub fn noise_type(&self) -> NoiseType {
        if self.quantized {
            NoiseType::GaussianQuantized
        } else {
            NoiseType::Gaussian
        }
    }

    pub fn apply(&mut self, value: f64) -> f64 {
        let sample = match &self.sample {
            Some(normal) => normal.sample(&mut self.rng),
            None => self.params.mean,
        };
        let noisy = value + sample + self.bias;

        if self.quantized && self.params.precision > 0.0 {
            (noisy / self.params.precision).round() * self.params.precision
        } else {
            noisy
        }
    }

    pub fn mean(&self) -> f64 {
        self.params.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.params.std_dev
    }

    pub fn bias_mean(&self) -> f64 {
        self.params.bias_mean
    }

    pub fn bias_std_dev(&self) -> f64 {
        self.params.bias_std_dev
    }

    /// Bias drawn at construction, constant for the model's lifetime
    pub fn bias(&self) -> f64 {
        self.bias
    }

    pub fn precision(&self) -> f64 {
        self.params.precision
    }

    pub fn quantized(&self) -> bool {
        self.quantized
    }

    pub fn print(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        write!(
            out,
            "Gaussian noise, mean[{}], stddev[{}], bias[{}], precision[{}], quantized[{}]",
            self.params.mean, self.params.std_dev, self.bias, self.params.precision, self.quantized
        )
    }
}

fn draw(mean: f64, std_dev: f64, name: &'static str, rng: &mut ChaCha8Rng) -> Result<f64> {
    if std_dev == 0.0 {
        return Ok(mean);
    }
    let normal =
        Normal::new(mean, std_dev).map_err(|_| NoiseError::invalid(name, std_dev, "rejected by normal distribution"))?;
    Ok(normal.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(1234)
    }

    fn params(mean: f64, std_dev: f64, bias_mean: f64, bias_std_dev: f64) -> GaussianParams {
        GaussianParams {
            mean,
            std_dev,
            bias_mean,
            bias_std_dev,
            precision: 0.0,
        }
    }

    #[test]
    fn test_zero_variance_is_exact() {
        let mut model = GaussianNoiseModel::new(params(10.0, 0.0, 100.0, 0.0), false, rng()).unwrap();
        assert_eq!(model.bias(), 100.0);
        for x in [-5.0, 0.0, 42.0, 1e6] {
            assert!((model.apply(x) - (x + 110.0)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_bias_is_fixed_after_construction() {
        let mut model = GaussianNoiseModel::new(params(0.0, 1.0, 0.0, 5.0), false, rng()).unwrap();
        let bias = model.bias();
        for _ in 0..50 {
            model.apply(1.0);
        }
        assert_eq!(model.bias(), bias);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = GaussianNoiseModel::new(params(0.0, 2.0, 0.0, 1.0), false, rng()).unwrap();
        let mut b = GaussianNoiseModel::new(params(0.0, 2.0, 0.0, 1.0), false, rng()).unwrap();
        assert_eq!(a.bias(), b.bias());
        for _ in 0..20 {
            assert_eq!(a.apply(3.0), b.apply(3.0));
        }
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let err = GaussianNoiseModel::new(params(0.0, -1.0, 0.0, 0.0), false, rng()).unwrap_err();
        assert!(matches!(err, NoiseError::InvalidParameter { name: "stddev", .. }));

        let err = GaussianNoiseModel::new(params(0.0, 1.0, 0.0, -0.5), false, rng()).unwrap_err();
        assert!(matches!(err, NoiseError::InvalidParameter { name: "bias_stddev", .. }));

        let err = GaussianNoiseModel::new(params(f64::NAN, 1.0, 0.0, 0.0), false, rng()).unwrap_err();
        assert!(matches!(err, NoiseError::InvalidParameter { name: "mean", .. }));

        let err = GaussianNoiseModel::new(params(0.0, f64::INFINITY, 0.0, 0.0), false, rng()).unwrap_err();
        assert!(matches!(err, NoiseError::InvalidParameter { name: "stddev", .. }));
    }

    #[test]
    fn test_quantization_rounds_half_away_from_zero() {
        let p = GaussianParams {
            precision: 0.5,
            ..GaussianParams::default()
        };
        let mut model = GaussianNoiseModel::new(p, true, rng()).unwrap();
        assert!((model.apply(0.25) - 0.5).abs() < 1e-9);
        assert!((model.apply(-0.25) + 0.5).abs() < 1e-9);
        assert!((model.apply(0.74) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_precision_ignored_unless_quantized() {
        let p = GaussianParams {
            precision: 0.3,
            ..GaussianParams::default()
        };
        let mut plain = GaussianNoiseModel::new(p, false, rng()).unwrap();
        assert_eq!(plain.apply(0.32), 0.32);
        assert_eq!(plain.noise_type(), NoiseType::Gaussian);

        let mut negative = GaussianNoiseModel::new(
            GaussianParams {
                precision: -0.3,
                ..GaussianParams::default()
            },
            true,
            rng(),
        )
        .unwrap();
        assert_eq!(negative.apply(0.32), 0.32);
        assert_eq!(negative.noise_type(), NoiseType::GaussianQuantized);
    }

    #[test]
    fn test_print() {
        let model = GaussianNoiseModel::new(params(1.5, 0.0, 2.0, 0.0), false, rng()).unwrap();
        let mut out = String::new();
        model.print(&mut out).unwrap();
        assert_eq!(
            out,
            "Gaussian noise, mean[1.5], stddev[0], bias[2], precision[0], quantized[false]"
        );
    }
}
