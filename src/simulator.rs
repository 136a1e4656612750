//! Stand-in for the image generation engine.
//!
//! There is no model behind the studio: a request either fails with the
//! configured probability or, after an artificial delay, yields one of the
//! pre-rendered mock images.

use std::time::Duration;

use thiserror::Error;

use crate::domain::types::{ImageUrl, TypeConstraintError};
use crate::models::config::SimulatorConfig;

#[derive(Debug, Error, PartialEq)]
pub enum SimulatorError {
    #[error("failure rate must be within [0, 1], got {0}")]
    InvalidFailureRate(f64),
    #[error("at least one mock image is required")]
    NoImages,
    #[error("invalid mock image url: {0}")]
    InvalidImage(#[from] TypeConstraintError),
}

#[derive(Debug, Clone)]
pub struct GenerationSimulator {
    failure_rate: f64,
    latency: Duration,
    images: Vec<ImageUrl>,
}

impl GenerationSimulator {
    pub fn new(
        failure_rate: f64,
        latency: Duration,
        images: Vec<ImageUrl>,
    ) -> Result<Self, SimulatorError> {
        if !(0.0..=1.0).contains(&failure_rate) {
            return Err(SimulatorError::InvalidFailureRate(failure_rate));
        }
        if images.is_empty() {
            return Err(SimulatorError::NoImages);
        }
        Ok(Self {
            failure_rate,
            latency,
            images,
        })
    }

    pub fn from_config(config: &SimulatorConfig) -> Result<Self, SimulatorError> {
        let images = config
            .images
            .iter()
            .map(|url| ImageUrl::new(url.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(
            config.failure_rate,
            Duration::from_millis(config.latency_ms),
            images,
        )
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Draws whether the engine reports itself overloaded for this request.
    pub fn should_fail(&self) -> bool {
        self.failure_rate > 0.0 && rand::random_bool(self.failure_rate)
    }

    /// Picks one of the mock images uniformly at random.
    pub fn pick_image(&self) -> ImageUrl {
        let index = rand::random_range(0..self.images.len());
        self.images[index].clone()
    }

    /// Waits out the simulated processing time and returns the "generated" image.
    ///
    /// Dropping the returned future abandons the generation.
    pub async fn render(&self) -> ImageUrl {
        if !self.latency.is_zero() {
            actix_web::rt::time::sleep(self.latency).await;
        }
        self.pick_image()
    }
}
