//! Pipeline configuration
//!
//! Every tunable constant of the pipeline lives here. All sections use
//! `#[serde(default)]`, so a JSON file only needs the values it changes:
//!
//! ```json
//! { "sauvola": { "k": 0.1 }, "cleanup": { "min_object_size": 80 } }
//! ```

use std::f64::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use vein_filter::{BorderPolicy, ClaheParams, DiffusionParams, GaborParams};
use vein_region::ConnectivityType;

use crate::{BinarizeError, BinarizeResult};

/// Perona-Malik diffusion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffusionConfig {
    pub iterations: u32,
    pub kappa: f32,
    pub gamma_step: f32,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            kappa: 100.0,
            gamma_step: 0.1,
        }
    }
}

impl DiffusionConfig {
    pub fn params(&self) -> DiffusionParams {
        DiffusionParams {
            iterations: self.iterations,
            kappa: self.kappa,
            gamma: self.gamma_step,
        }
    }
}

/// CLAHE settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheConfig {
    pub clip_limit: f32,
    pub tiles_x: u32,
    pub tiles_y: u32,
}

impl Default for ClaheConfig {
    fn default() -> Self {
        Self {
            clip_limit: 1.0,
            tiles_x: 2,
            tiles_y: 2,
        }
    }
}

impl ClaheConfig {
    pub fn params(&self) -> ClaheParams {
        ClaheParams {
            clip_limit: self.clip_limit,
            tiles_x: self.tiles_x,
            tiles_y: self.tiles_y,
        }
    }
}

/// Out-of-image sampling for the Gabor correlation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorderMode {
    Replicate,
    /// Mirror without repeating the edge pixel (`dcb|abcd|cba`)
    #[default]
    Reflect101,
    Zero,
}

impl From<BorderMode> for BorderPolicy {
    fn from(mode: BorderMode) -> Self {
        match mode {
            BorderMode::Replicate => BorderPolicy::Replicate,
            BorderMode::Reflect101 => BorderPolicy::Reflect101,
            BorderMode::Zero => BorderPolicy::Zero,
        }
    }
}

/// Gabor bank and blend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaborConfig {
    /// Orientations in radians, fused in this order
    pub orientations: Vec<f64>,
    /// Spatial frequency in cycles per pixel; the wavelength is `1 / frequency`
    pub frequency: f64,
    pub sigma: f64,
    pub aspect: f64,
    pub kernel_size: u32,
    /// Each kernel is divided by `normalization * sum(kernel)`
    pub normalization: f32,
    pub blend_enhanced: f32,
    pub blend_ridge: f32,
    pub border: BorderMode,
}

impl Default for GaborConfig {
    fn default() -> Self {
        Self {
            orientations: vec![0.0, PI / 4.0, PI / 2.0, 3.0 * PI / 4.0],
            frequency: 0.1,
            sigma: 4.0,
            aspect: 0.3,
            kernel_size: 15,
            normalization: 1.5,
            blend_enhanced: 0.95,
            blend_ridge: 0.05,
            border: BorderMode::Reflect101,
        }
    }
}

impl GaborConfig {
    /// Kernel parameters for one orientation.
    pub fn params(&self, theta: f64) -> GaborParams {
        GaborParams {
            size: self.kernel_size,
            sigma: self.sigma,
            theta,
            lambda: 1.0 / self.frequency,
            aspect: self.aspect,
            psi: 0.0,
        }
    }
}

/// Multi-window Sauvola settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SauvolaConfig {
    pub windows: Vec<u32>,
    pub k: f32,
    pub r: f32,
}

impl Default for SauvolaConfig {
    fn default() -> Self {
        Self {
            windows: vec![27, 31, 35],
            k: 0.06,
            r: 128.0,
        }
    }
}

impl SauvolaConfig {
    pub fn params(&self) -> vein_color::SauvolaParams {
        vein_color::SauvolaParams {
            windows: self.windows.clone(),
            k: self.k,
            r: self.r,
        }
    }
}

/// Component connectivity for small-object removal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    Four,
    #[default]
    Eight,
}

impl From<Connectivity> for ConnectivityType {
    fn from(c: Connectivity) -> Self {
        match c {
            Connectivity::Four => ConnectivityType::FourWay,
            Connectivity::Eight => ConnectivityType::EightWay,
        }
    }
}

/// Morphological cleanup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Side of the elliptical opening element; 1 leaves the mask unchanged
    pub open_size: u32,
    /// Components with fewer pixels are removed
    pub min_object_size: u32,
    pub median_size: u32,
    pub connectivity: Connectivity,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            open_size: 1,
            min_object_size: 50,
            median_size: 5,
            connectivity: Connectivity::Eight,
        }
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub gamma: f32,
    pub contrast_alpha: f32,
    pub contrast_beta: f32,
    pub highlight_strength: f32,
    pub diffusion: DiffusionConfig,
    pub clahe: ClaheConfig,
    pub gabor: GaborConfig,
    pub sauvola: SauvolaConfig,
    pub cleanup: CleanupConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            gamma: 2.2,
            contrast_alpha: 1.9,
            contrast_beta: 0.0,
            highlight_strength: 50.0,
            diffusion: DiffusionConfig::default(),
            clahe: ClaheConfig::default(),
            gabor: GaborConfig::default(),
            sauvola: SauvolaConfig::default(),
            cleanup: CleanupConfig::default(),
        }
    }
}

fn invalid(msg: impl Into<String>) -> BinarizeError {
    BinarizeError::Config(msg.into())
}

impl PipelineConfig {
    /// Check the values that would otherwise fail deep inside a stage.
    ///
    /// # Errors
    ///
    /// Returns [`BinarizeError::Config`] naming the first offending field.
    pub fn validate(&self) -> BinarizeResult<()> {
        if !self.gamma.is_finite() || self.gamma <= 0.0 {
            return Err(invalid(format!("gamma must be > 0, got {}", self.gamma)));
        }
        if !self.contrast_alpha.is_finite() || !self.contrast_beta.is_finite() {
            return Err(invalid("contrast alpha and beta must be finite"));
        }
        if !self.highlight_strength.is_finite() || self.highlight_strength < 0.0 {
            return Err(invalid(format!(
                "highlight_strength must be >= 0, got {}",
                self.highlight_strength
            )));
        }

        let d = &self.diffusion;
        if !d.kappa.is_finite() || d.kappa <= 0.0 {
            return Err(invalid(format!("diffusion.kappa must be > 0, got {}", d.kappa)));
        }
        if !d.gamma_step.is_finite() {
            return Err(invalid("diffusion.gamma_step must be finite"));
        }

        let c = &self.clahe;
        if c.tiles_x == 0 || c.tiles_y == 0 {
            return Err(invalid(format!(
                "clahe tile grid must be non-empty, got {}x{}",
                c.tiles_x, c.tiles_y
            )));
        }
        if !c.clip_limit.is_finite() || c.clip_limit <= 0.0 {
            return Err(invalid(format!(
                "clahe.clip_limit must be > 0, got {}",
                c.clip_limit
            )));
        }

        let g = &self.gabor;
        if g.orientations.is_empty() {
            return Err(invalid("gabor.orientations is empty"));
        }
        if g.kernel_size == 0 || g.kernel_size % 2 == 0 {
            return Err(invalid(format!(
                "gabor.kernel_size must be odd, got {}",
                g.kernel_size
            )));
        }
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(g.frequency) || !positive(g.sigma) || !positive(g.aspect) {
            return Err(invalid("gabor frequency, sigma and aspect must be > 0"));
        }
        if !g.normalization.is_finite() || g.normalization == 0.0 {
            return Err(invalid("gabor.normalization must be nonzero"));
        }

        let s = &self.sauvola;
        if s.windows.is_empty() {
            return Err(invalid("sauvola.windows is empty"));
        }
        if let Some(&w) = s.windows.iter().find(|&&w| w == 0 || w % 2 == 0) {
            return Err(invalid(format!("sauvola window must be odd, got {}", w)));
        }
        if !s.r.is_finite() || s.r <= 0.0 {
            return Err(invalid(format!("sauvola.r must be > 0, got {}", s.r)));
        }

        let m = &self.cleanup;
        if m.open_size == 0 {
            return Err(invalid("cleanup.open_size must be >= 1"));
        }
        if m.median_size == 0 || m.median_size % 2 == 0 {
            return Err(invalid(format!(
                "cleanup.median_size must be odd, got {}",
                m.median_size
            )));
        }
        Ok(())
    }

    /// Parse a configuration from JSON text. Missing fields keep their
    /// defaults.
    pub fn from_json(text: &str) -> BinarizeResult<Self> {
        serde_json::from_str(text).map_err(|e| invalid(e.to_string()))
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> BinarizeResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| invalid(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> BinarizeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| invalid(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.gabor.orientations.len(), 4);
        assert!((config.gabor.params(0.0).lambda - 10.0).abs() < 1e-9);
        assert_eq!(config.sauvola.windows, vec![27, 31, 35]);
        assert_eq!(config.gabor.border, BorderMode::Reflect101);
        assert_eq!(BorderPolicy::from(config.gabor.border), BorderPolicy::Reflect101);
    }

    #[test]
    fn test_partial_json() {
        let config =
            PipelineConfig::from_json(r#"{"gamma": 1.0, "gabor": {"border": "replicate"}}"#)
                .unwrap();
        assert_eq!(config.gamma, 1.0);
        assert_eq!(config.gabor.border, BorderMode::Replicate);
        assert_eq!(config.gabor.kernel_size, 15);
        assert_eq!(config.cleanup, CleanupConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = PipelineConfig::default();
        config.cleanup.connectivity = Connectivity::Four;
        let text = config.to_json().unwrap();
        assert!(text.contains("\"four\""));
        assert_eq!(PipelineConfig::from_json(&text).unwrap(), config);
    }

    #[test]
    fn test_validate_rejects() {
        let mut c = PipelineConfig::default();
        c.sauvola.windows = vec![27, 30];
        assert!(matches!(c.validate(), Err(BinarizeError::Config(_))));

        let mut c = PipelineConfig::default();
        c.gabor.kernel_size = 14;
        assert!(c.validate().is_err());

        let mut c = PipelineConfig::default();
        c.gamma = 0.0;
        assert!(c.validate().is_err());

        let mut c = PipelineConfig::default();
        c.clahe.tiles_y = 0;
        assert!(c.validate().is_err());

        let mut c = PipelineConfig::default();
        c.cleanup.median_size = 4;
        assert!(c.validate().is_err());

        let mut c = PipelineConfig::default();
        c.gabor.orientations.clear();
        assert!(c.validate().is_err());

        assert!(PipelineConfig::from_json("{\"gamma\": \"x\"}").is_err());
    }
}
