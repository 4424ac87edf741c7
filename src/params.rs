use crate::effects::levels::validate_level_params;
use crate::foundation::error::{DrapeError, DrapeResult};

/// Immutable parameter record for one combined-effects run.
///
/// Defaults mirror the interactive front-end's slider defaults. Construct via
/// struct literal update syntax or [`EffectParameters::from_json`]; call
/// [`EffectParameters::validate`] before handing the set to the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EffectParameters {
    /// Texture scale factor applied before tiling (> 0).
    pub texture_scale: f32,
    /// Tile the texture across the background instead of stretching it.
    pub tile: bool,
    /// Depth displacement strength in pixels (negative reverses direction).
    pub displacement_strength: f32,
    /// Gaussian sigma applied to the depth map before use (>= 0).
    pub blur_radius: f32,
    /// Lighting layer strength (0-1).
    pub lighting_strength: f32,
    /// Level black point (0-100).
    pub black_point: f32,
    /// Level white point (0-100, must exceed black_point).
    pub white_point: f32,
    /// Gamma correction (0.1-5.0).
    pub gamma: f32,
    /// Sigmoidal contrast (0.1-5.0, 1.0 is neutral).
    pub contrast: f32,
    /// Brightness modulation (-100..100, 0 is neutral).
    pub lightness: f32,
    /// High-frequency detail overlay strength (0-1, 0 skips the overlay).
    pub detail_strength: f32,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            texture_scale: 1.0,
            tile: true,
            displacement_strength: 20.0,
            blur_radius: 5.0,
            lighting_strength: 0.5,
            black_point: 0.0,
            white_point: 100.0,
            gamma: 1.0,
            contrast: 1.0,
            lightness: 0.0,
            detail_strength: 0.5,
        }
    }
}

impl EffectParameters {
    /// Check every field against its documented range.
    pub fn validate(&self) -> DrapeResult<()> {
        if !self.texture_scale.is_finite() || self.texture_scale <= 0.0 {
            return Err(DrapeError::invalid_input(
                "texture_scale must be finite and > 0",
            ));
        }
        if !self.displacement_strength.is_finite() {
            return Err(DrapeError::invalid_input(
                "displacement_strength must be finite",
            ));
        }
        if !self.blur_radius.is_finite() || self.blur_radius < 0.0 {
            return Err(DrapeError::invalid_input(
                "blur_radius must be finite and >= 0",
            ));
        }
        if !(0.0..=1.0).contains(&self.lighting_strength) {
            return Err(DrapeError::invalid_input(
                "lighting_strength must be in 0..=1",
            ));
        }
        if !(0.0..=1.0).contains(&self.detail_strength) {
            return Err(DrapeError::invalid_input(
                "detail_strength must be in 0..=1",
            ));
        }
        validate_level_params(
            self.black_point,
            self.white_point,
            self.gamma,
            self.contrast,
            self.lightness,
        )
    }

    /// Deserialize and validate a parameter set handed over as JSON by a
    /// front-end. Missing fields take their defaults; unknown fields are
    /// rejected.
    pub fn from_json(value: &serde_json::Value) -> DrapeResult<Self> {
        let params: Self = serde_json::from_value(value.clone())
            .map_err(|e| DrapeError::invalid_input(format!("bad parameter json: {e}")))?;
        params.validate()?;
        Ok(params)
    }
}
