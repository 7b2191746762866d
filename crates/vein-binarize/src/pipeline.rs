//! The binarization pipeline
//!
//! Stages run in a fixed order, each producing a fresh buffer:
//!
//! 1. load: normalize any decoded depth to 8 bpp gray
//! 2. illuminate: gamma, contrast stretch, highlight suppression
//! 3. denoise: Perona-Malik diffusion
//! 4. equalize: CLAHE
//! 5. enhance_ridges: Gabor bank, max fusion, blend with the equalized image
//! 6. binarize: multi-window Sauvola, OR fusion
//! 7. clean: opening, small-object removal, median
//!
//! Every stage keeps the image size; a stage that changes it is a bug and
//! panics.

use std::time::Instant;

use log::{debug, warn};
use vein_color::{sauvola_multiscale, suppress_highlights};
use vein_core::Pix;
use vein_filter::{
    BorderPolicy, FilterError, Kernel, anisotropic_diffusion, blend_gray, clahe,
    gabor_bank_response, gamma_trc_pix, linear_trc_pix, median_filter,
};
use vein_morph::open_ellipse;
use vein_region::remove_small_components;

use crate::{BinarizeError, BinarizeResult, PipelineConfig, Stage, StageError};

/// Every intermediate buffer of one run
#[derive(Debug, Clone)]
pub struct StageImages {
    pub loaded: Pix,
    pub illuminated: Pix,
    pub denoised: Pix,
    pub equalized: Pix,
    pub ridges: Pix,
    pub binary: Pix,
    pub cleaned: Pix,
}

impl StageImages {
    /// Stages paired with their buffers, in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, &Pix)> {
        [
            (Stage::Load, &self.loaded),
            (Stage::Illumination, &self.illuminated),
            (Stage::Denoise, &self.denoised),
            (Stage::Equalize, &self.equalized),
            (Stage::RidgeEnhance, &self.ridges),
            (Stage::Binarize, &self.binary),
            (Stage::Clean, &self.cleaned),
        ]
        .into_iter()
    }
}

/// A validated configuration with its Gabor bank built
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    kernels: Vec<Kernel>,
}

impl Pipeline {
    /// Validate `config` and build the normalized Gabor kernels.
    ///
    /// # Errors
    ///
    /// Returns [`BinarizeError::Config`] for invalid values and a
    /// [`Stage::RidgeEnhance`] error when a kernel cannot be normalized
    /// (its weights sum to zero).
    pub fn new(config: PipelineConfig) -> BinarizeResult<Self> {
        config.validate()?;
        if config.cleanup.open_size == 1 {
            warn!("cleanup.open_size is 1, the opening leaves the mask unchanged");
        }

        let gabor = &config.gabor;
        let kernels = gabor
            .orientations
            .iter()
            .map(|&theta| -> Result<Kernel, FilterError> {
                let mut kernel = Kernel::gabor(&gabor.params(theta))?;
                kernel.normalize_by_sum(gabor.normalization)?;
                Ok(kernel)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(BinarizeError::in_stage(Stage::RidgeEnhance))?;

        Ok(Self { config, kernels })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The normalized Gabor kernels, one per orientation.
    pub fn kernels(&self) -> &[Kernel] {
        &self.kernels
    }

    fn timed<F>(&self, stage: Stage, pix: &Pix, f: F) -> BinarizeResult<Pix>
    where
        F: FnOnce(&Pix) -> Result<Pix, StageError>,
    {
        let start = Instant::now();
        let out = f(pix).map_err(BinarizeError::in_stage(stage))?;
        assert_eq!(
            out.dimensions(),
            pix.dimensions(),
            "stage {} changed the image size",
            stage
        );
        debug!(
            "{}: {}x{} in {:.2?}",
            stage,
            out.width(),
            out.height(),
            start.elapsed()
        );
        Ok(out)
    }

    /// Normalize a decoded image to 8 bpp gray.
    ///
    /// RGB collapses with the fixed-point luma weights; binary maps set
    /// bits to 255.
    pub fn load(&self, pix: &Pix) -> BinarizeResult<Pix> {
        self.timed(Stage::Load, pix, |p| Ok(p.convert_to_8()?))
    }

    /// Gamma, linear contrast stretch, then HLS highlight suppression.
    pub fn illuminate(&self, pix: &Pix) -> BinarizeResult<Pix> {
        let c = &self.config;
        self.timed(Stage::Illumination, pix, |p| {
            let gamma = gamma_trc_pix(p, c.gamma)?;
            let stretched = linear_trc_pix(&gamma, c.contrast_alpha, c.contrast_beta)?;
            Ok(suppress_highlights(&stretched, c.highlight_strength)?)
        })
    }

    /// Perona-Malik diffusion. RGB input is collapsed to gray first.
    pub fn denoise(&self, pix: &Pix) -> BinarizeResult<Pix> {
        let params = self.config.diffusion.params();
        self.timed(Stage::Denoise, pix, |p| {
            let gray = p.convert_to_8()?;
            Ok(anisotropic_diffusion(&gray, &params)?)
        })
    }

    /// Contrast-limited adaptive histogram equalization.
    pub fn equalize(&self, pix: &Pix) -> BinarizeResult<Pix> {
        let params = self.config.clahe.params();
        self.timed(Stage::Equalize, pix, |p| Ok(clahe(p, &params)?))
    }

    /// Max-fused Gabor response blended with the input.
    pub fn enhance_ridges(&self, pix: &Pix) -> BinarizeResult<Pix> {
        let g = &self.config.gabor;
        let border: BorderPolicy = g.border.into();
        self.timed(Stage::RidgeEnhance, pix, |p| {
            let ridge = gabor_bank_response(p, &self.kernels, border)?;
            Ok(blend_gray(p, g.blend_enhanced, &ridge, g.blend_ridge)?)
        })
    }

    /// Multi-window Sauvola thresholding. Returns 8 bpp 0/255.
    pub fn binarize(&self, pix: &Pix) -> BinarizeResult<Pix> {
        let params = self.config.sauvola.params();
        self.timed(Stage::Binarize, pix, |p| {
            let mask = sauvola_multiscale(p, &params)?;
            Ok(mask.convert_to_8()?)
        })
    }

    /// Opening, small-object removal and median filtering of a 0/255
    /// mask. Returns 8 bpp 0/255.
    pub fn clean(&self, pix: &Pix) -> BinarizeResult<Pix> {
        let m = &self.config.cleanup;
        self.timed(Stage::Clean, pix, |p| {
            let mask = p.convert_to_8()?.convert_8_to_1(127)?;
            let opened = open_ellipse(&mask, m.open_size)?;
            let kept =
                remove_small_components(&opened, m.min_object_size, m.connectivity.into())?;
            let gray = kept.convert_to_8()?;
            Ok(median_filter(&gray, m.median_size, m.median_size)?)
        })
    }

    /// Run every stage and return the cleaned mask.
    pub fn run(&self, pix: &Pix) -> BinarizeResult<Pix> {
        Ok(self.run_with_stages(pix)?.cleaned)
    }

    /// Run every stage and keep all intermediate buffers.
    pub fn run_with_stages(&self, pix: &Pix) -> BinarizeResult<StageImages> {
        let start = Instant::now();
        let loaded = self.load(pix)?;
        let illuminated = self.illuminate(&loaded)?;
        let denoised = self.denoise(&illuminated)?;
        let equalized = self.equalize(&denoised)?;
        let ridges = self.enhance_ridges(&equalized)?;
        let binary = self.binarize(&ridges)?;
        let cleaned = self.clean(&binary)?;
        debug!("pipeline finished in {:.2?}", start.elapsed());

        Ok(StageImages {
            loaded,
            illuminated,
            denoised,
            equalized,
            ridges,
            binary,
            cleaned,
        })
    }
}
