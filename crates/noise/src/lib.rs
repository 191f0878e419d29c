//! # Noise
//!
//! Scalar noise models applied to simulated measurements.
//!
//! Responsibilities:
//! - Closed set of noise variants behind one [`NoiseModel::apply`] contract
//! - Construction from a [`NoiseDescriptor`](contracts::NoiseDescriptor) via [`NoiseFactory`]
//! - Seedable random streams so that statistical behaviour is reproducible
//!
//! ## Example
//!
//! ```
//! use contracts::{NoiseDescriptor, TracingSink};
//! use noise::NoiseFactory;
//!
//! let mut factory = NoiseFactory::with_seed(7, TracingSink::shared());
//! let descriptor = NoiseDescriptor::gaussian(1.0, 0.0, 0.5, 0.0);
//! let mut model = factory.new_noise_model(&descriptor, Some("altimeter")).unwrap();
//! assert!((model.apply(10.0, 0.0) - 11.5).abs() < 1e-9);
//! ```

mod custom;
mod error;
mod factory;
mod gaussian;
mod model;

pub use contracts::NoiseType;
pub use custom::{CustomNoise, CustomNoiseCallback};
pub use error::{NoiseError, Result};
pub use factory::NoiseFactory;
pub use gaussian::{GaussianNoiseModel, GaussianParams};
pub use model::{write_base_description, NoiseModel};
