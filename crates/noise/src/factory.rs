//! Noise factory
//!
//! Builds [`NoiseModel`]s from descriptors. Owns the master random stream;
//! every Gaussian model gets a child stream seeded from it, so a factory
//! created with [`NoiseFactory::with_seed`] hands out reproducible models.

use std::fmt;

use contracts::{Diagnostic, NoiseDescriptor, NoiseType, SharedSink};
use rand::{Rng, SeedableRng};
use rand_chacha::{ChaCha20Rng, ChaCha8Rng};
use tracing::debug;

use crate::custom::CustomNoise;
use crate::error::{NoiseError, Result};
use crate::gaussian::{GaussianNoiseModel, GaussianParams};
use crate::model::NoiseModel;

const COMPONENT: &str = "noise_factory";

/// Noise model factory
pub struct NoiseFactory {
    rng: ChaCha20Rng,
    sink: SharedSink,
    created: u64,
}

impl NoiseFactory {
    /// Factory seeded from OS entropy
    pub fn new(sink: SharedSink) -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
            sink,
            created: 0,
        }
    }

    /// Factory with a fixed master seed
    pub fn with_seed(seed: u64, sink: SharedSink) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            sink,
            created: 0,
        }
    }

    /// Diagnostic sink failures are reported to
    pub fn sink(&self) -> &SharedSink {
        &self.sink
    }

    /// Number of models built so far
    pub fn created(&self) -> u64 {
        self.created
    }

    /// Build a model from a descriptor.
    ///
    /// `sensor_kind` is only used for diagnostics.
    ///
    /// # Errors
    ///
    /// [`NoiseError::UnsupportedType`] for anything but `none`, `gaussian` and
    /// `gaussian_quantized`; [`NoiseError::InvalidParameter`] for parameters a
    /// normal distribution cannot take. Failures are also reported on the sink.
    pub fn new_noise_model(
        &mut self,
        descriptor: &NoiseDescriptor,
        sensor_kind: Option<&str>,
    ) -> Result<NoiseModel> {
        let result = self.build(descriptor, sensor_kind);
        if let Err(e) = &result {
            self.sink.report(Diagnostic::error(
                COMPONENT,
                format!(
                    "failed to create noise model for sensor kind '{}': {e}",
                    sensor_kind.unwrap_or("unknown")
                ),
            ));
        }
        result
    }

    /// Build a model of the given type with zero parameters.
    ///
    /// Custom models come back without a callback.
    pub fn new_noise_model_from_type(&mut self, noise_type: NoiseType) -> Result<NoiseModel> {
        match noise_type {
            NoiseType::None => Ok(NoiseModel::None),
            NoiseType::Custom => Ok(self.finish(NoiseModel::Custom(CustomNoise::new()), None)),
            NoiseType::Gaussian => self.gaussian(GaussianParams::default(), false, None),
            NoiseType::GaussianQuantized => self.gaussian(GaussianParams::default(), true, None),
        }
    }

    /// Build a model from a stable integer type code.
    ///
    /// # Errors
    ///
    /// [`NoiseError::UnsupportedTypeCode`] for codes outside `0..=3`.
    pub fn new_noise_model_from_code(&mut self, code: i32) -> Result<NoiseModel> {
        let noise_type = NoiseType::try_from(code).map_err(|_| {
            let e = NoiseError::UnsupportedTypeCode { code };
            self.sink.report(Diagnostic::error(COMPONENT, e.to_string()));
            e
        })?;
        self.new_noise_model_from_type(noise_type)
    }

    fn build(&mut self, descriptor: &NoiseDescriptor, sensor_kind: Option<&str>) -> Result<NoiseModel> {
        let noise_type = descriptor
            .parsed_type()
            .map_err(|_| NoiseError::UnsupportedType {
                value: descriptor.noise_type.clone(),
            })?;

        match noise_type {
            NoiseType::None => Ok(self.finish(NoiseModel::None, sensor_kind)),
            NoiseType::Gaussian => self.gaussian(GaussianParams::from(descriptor), false, sensor_kind),
            NoiseType::GaussianQuantized => {
                if descriptor.precision <= 0.0 {
                    self.sink.report(Diagnostic::warning(
                        COMPONENT,
                        format!(
                            "quantized noise with precision {} behaves as plain gaussian",
                            descriptor.precision
                        ),
                    ));
                }
                self.gaussian(GaussianParams::from(descriptor), true, sensor_kind)
            }
            // a callback cannot be declared in a descriptor
            NoiseType::Custom => Err(NoiseError::UnsupportedType {
                value: descriptor.noise_type.clone(),
            }),
        }
    }

    fn gaussian(
        &mut self,
        params: GaussianParams,
        quantized: bool,
        sensor_kind: Option<&str>,
    ) -> Result<NoiseModel> {
        let child = ChaCha8Rng::seed_from_u64(self.rng.gen::<u64>());
        let model = GaussianNoiseModel::new(params, quantized, child)?;
        Ok(self.finish(NoiseModel::Gaussian(model), sensor_kind))
    }

    fn finish(&mut self, model: NoiseModel, sensor_kind: Option<&str>) -> NoiseModel {
        self.created += 1;
        debug!(
            noise_type = %model.noise_type(),
            sensor_kind = sensor_kind.unwrap_or("unknown"),
            model = %model,
            "noise model created"
        );
        model
    }
}

impl fmt::Debug for NoiseFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoiseFactory")
            .field("created", &self.created)
            .finish_non_exhaustive()
    }
}
