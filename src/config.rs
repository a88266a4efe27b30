//! JSON settings for the pose estimator.
//!
//! ```json
//! {
//!     "model": "COCO",
//!     "threshold": 0.1,
//!     "matching": "exclusive"
//! }
//! ```
//!
//! Every field except `model` is optional. The OpenPose-style names `dataset`, `thresh`, `W_in`
//! and `H_in` are accepted as aliases, so OpenPose settings files load as they are.
//!
//! Some settings describe the steps around the estimator: which network to load, on which device,
//! how to preprocess its input, and where to log. [`PoseEstimator`] never reads them; they are
//! stored for the caller running those steps.
//!
//! [`PoseEstimator`]: crate::pipeline::PoseEstimator

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    connection::{Matching, ScoringParams},
    resolution::Resolution,
    topology::BodyModel,
};

/// Pose estimator settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Name of the body model (`COCO`, `BODY_25` or `HAND`).
    #[serde(alias = "dataset")]
    pub model: String,
    /// Smoothed confidence a pixel must exceed to be part of a peak.
    #[serde(alias = "thresh")]
    pub threshold: f32,
    pub samples: usize,
    pub sample_threshold: f32,
    pub min_fraction: f32,
    pub matching: Matching,
    /// Seed of the visualization palette. A random palette is used if unset.
    pub palette_seed: Option<u64>,
    /// Network input width. Only used by the caller's preprocessing, see
    /// [`Settings::input_resolution`].
    #[serde(alias = "W_in")]
    pub input_width: u32,
    /// Network input height. Only used by the caller's preprocessing.
    #[serde(alias = "H_in")]
    pub input_height: u32,
    /// Factor the caller applies to 8-bit pixel values before they are fed to the network.
    pub scale: f32,
    /// Network description file. Not read by the estimator.
    #[serde(alias = "modelTxt", skip_serializing_if = "Option::is_none")]
    pub model_txt: Option<String>,
    /// Network weights file. Not read by the estimator.
    #[serde(alias = "modelBin", skip_serializing_if = "Option::is_none")]
    pub model_bin: Option<String>,
    /// Input image or camera. Not read by the estimator.
    #[serde(alias = "imageFile", skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    /// Inference device (`CPU` or `GPU`). Not read by the estimator.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// Log file. Not read by the estimator, which logs through the `log` facade.
    #[serde(alias = "logPath", skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: String::new(),
            threshold: Self::DEFAULT_THRESHOLD,
            samples: ScoringParams::DEFAULT_SAMPLES,
            sample_threshold: ScoringParams::DEFAULT_SAMPLE_THRESHOLD,
            min_fraction: ScoringParams::DEFAULT_MIN_FRACTION,
            matching: Matching::default(),
            palette_seed: None,
            input_width: 368,
            input_height: 368,
            scale: 1.0 / 255.0,
            model_txt: None,
            model_bin: None,
            image_file: None,
            device: None,
            log_path: None,
        }
    }
}

impl Settings {
    pub const DEFAULT_THRESHOLD: f32 = 0.1;

    /// Loads settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let string = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read settings from '{}'", path.display()))?;
        Self::from_json(&string).with_context(|| format!("invalid settings in '{}'", path.display()))
    }

    /// Parses settings from a JSON string.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        if settings.model.is_empty() {
            anyhow::bail!("no model type specified");
        }
        Ok(settings)
    }

    /// Checks the settings and returns the selected body model.
    ///
    /// Unknown and incomplete models are rejected, as are out-of-range scoring parameters.
    pub fn validate(&self) -> anyhow::Result<BodyModel> {
        let model = self.model.parse::<BodyModel>()?;
        log::debug!("model type: {model}");
        if !model.is_complete() {
            log::warn!("{model} model is not finished yet, try one of the other models");
            anyhow::bail!("model type '{model}' is not supported yet");
        }

        if !self.threshold.is_finite() {
            anyhow::bail!("detection threshold must be finite, got {}", self.threshold);
        }
        if self.samples < 2 {
            anyhow::bail!(
                "at least 2 samples per connection are required, got {}",
                self.samples
            );
        }
        if !self.sample_threshold.is_finite() {
            anyhow::bail!(
                "sample threshold must be finite, got {}",
                self.sample_threshold
            );
        }
        if !(0.0..1.0).contains(&self.min_fraction) {
            anyhow::bail!(
                "minimum sample fraction must be in range 0..1, got {}",
                self.min_fraction
            );
        }
        if self.input_resolution().is_empty() || !(self.scale > 0.0) {
            anyhow::bail!(
                "invalid network input {} with scale {}",
                self.input_resolution(),
                self.scale
            );
        }

        Ok(model)
    }

    /// Returns the connection scoring parameters.
    pub fn scoring_params(&self) -> ScoringParams {
        ScoringParams {
            samples: self.samples,
            sample_threshold: self.sample_threshold,
            min_fraction: self.min_fraction,
            matching: self.matching,
        }
    }

    /// Returns the resolution the caller should resize frames to before running the network.
    pub fn input_resolution(&self) -> Resolution {
        Resolution::new(self.input_width, self.input_height)
    }
}
