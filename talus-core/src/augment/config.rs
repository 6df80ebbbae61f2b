use crate::foundation::error::{TalusError, TalusResult};

/// Configuration for the paired augmentation stage.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Number of independent variants generated per input pair.
    pub variant_count: u32,
    /// Discrete rotation angles in degrees; 0 means identity. Drawn uniformly
    /// per variant.
    pub rotation_angles: Vec<f32>,
    /// Probability of a horizontal mirror, in `[0, 1]`.
    pub flip_probability: f32,
    /// Inclusive `(low, high)` range for the uniform scale factor; both > 0.
    pub scale_range: (f32, f32),
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            variant_count: 5,
            rotation_angles: vec![0.0, 90.0, 180.0, 270.0],
            flip_probability: 0.5,
            scale_range: (0.8, 1.2),
        }
    }
}

impl AugmentConfig {
    /// Check value ranges; called by every augmentation entry point.
    pub fn validate(&self) -> TalusResult<()> {
        if self.rotation_angles.is_empty() {
            return Err(TalusError::validation("rotation_angles must not be empty"));
        }
        if self.rotation_angles.iter().any(|a| !a.is_finite()) {
            return Err(TalusError::validation("rotation_angles must be finite"));
        }
        if !self.flip_probability.is_finite()
            || !(0.0..=1.0).contains(&self.flip_probability)
        {
            return Err(TalusError::validation(
                "flip_probability must be within [0, 1]",
            ));
        }
        let (low, high) = self.scale_range;
        if !low.is_finite() || !high.is_finite() || low <= 0.0 || low > high {
            return Err(TalusError::validation(
                "scale_range must satisfy 0 < low <= high",
            ));
        }
        Ok(())
    }
}
