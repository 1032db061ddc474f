//! Heatmap tile-rendering parameters per slice index.

use crate::error::{LayersError, Result};
use geolayers_types::gradient::{Color, ColorStop, GradientSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inclusive bounds of the slice slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceRange {
    pub min: u32,
    pub max: u32,
}

impl SliceRange {
    pub fn new(min: u32, max: u32) -> Result<Self> {
        if min > max {
            return Err(LayersError::InvalidConfig(format!(
                "Slice range minimum {} exceeds maximum {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn contains(&self, index: u32) -> bool {
        (self.min..=self.max).contains(&index)
    }

    /// `OutOfRange` unless `index` lies within the bounds. Never clamps.
    pub fn check(&self, index: u32) -> Result<()> {
        if self.contains(index) {
            Ok(())
        } else {
            Err(LayersError::OutOfRange {
                index,
                min: self.min,
                max: self.max,
            })
        }
    }

    /// Number of slices in the range.
    pub fn count(&self) -> usize {
        (self.max - self.min) as usize + 1
    }
}

/// Amber ramp: transparent through orange to deep red.
pub fn amber_ramp() -> Vec<ColorStop> {
    vec![
        ColorStop::new(0.0, Color::argb(0, 0, 255, 255)),
        ColorStop::new(0.001, Color::argb(255 / 3 * 2, 221, 162, 0)),
        ColorStop::new(0.10, Color::rgb(213, 124, 0)),
        ColorStop::new(0.30, Color::rgb(198, 49, 0)),
        ColorStop::new(1.0, Color::rgb(191, 22, 9)),
    ]
}

/// Cool ramp: transparent cyan through blue to red.
pub fn blue_red_ramp() -> Vec<ColorStop> {
    vec![
        ColorStop::new(0.0, Color::argb(0, 0, 255, 255)),
        ColorStop::new(0.10, Color::argb(255 / 3 * 2, 0, 255, 255)),
        ColorStop::new(0.20, Color::rgb(0, 191, 255)),
        ColorStop::new(0.60, Color::rgb(0, 0, 127)),
        ColorStop::new(1.0, Color::rgb(255, 0, 0)),
    ]
}

/// Default heatmap parameters: radius 40, fully opaque, amber ramp.
pub fn default_gradient() -> GradientSpec {
    GradientSpec::new(40, 1.0, amber_ramp())
}

/// Pure mapping from slice index to [`GradientSpec`].
///
/// Indices inside the slider range get their override if one is defined and
/// the base spec otherwise; indices outside it are rejected.
///
/// # Examples
///
/// ```rust
/// use geolayers::gradient::{GradientConfig, SliceRange, default_gradient};
/// use geolayers::LayersError;
///
/// let config = GradientConfig::new(SliceRange::new(0, 9)?, default_gradient())?;
/// assert_eq!(config.config_for(3)?.radius, 40);
/// assert!(matches!(config.config_for(10), Err(LayersError::OutOfRange { .. })));
/// # Ok::<(), LayersError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GradientConfig {
    range: SliceRange,
    base: GradientSpec,
    overrides: BTreeMap<u32, GradientSpec>,
}

impl GradientConfig {
    pub fn new(range: SliceRange, base: GradientSpec) -> Result<Self> {
        base.validate().map_err(LayersError::InvalidConfig)?;
        Ok(Self {
            range,
            base,
            overrides: BTreeMap::new(),
        })
    }

    /// Use `spec` instead of the base for slice `index`.
    pub fn with_override(mut self, index: u32, spec: GradientSpec) -> Result<Self> {
        self.range.check(index).map_err(|_| {
            LayersError::InvalidConfig(format!(
                "Gradient override for slice {} lies outside [{}, {}]",
                index, self.range.min, self.range.max
            ))
        })?;
        spec.validate()
            .map_err(|e| LayersError::InvalidConfig(format!("slice {}: {}", index, e)))?;
        self.overrides.insert(index, spec);
        Ok(self)
    }

    pub fn range(&self) -> SliceRange {
        self.range
    }

    pub fn base(&self) -> &GradientSpec {
        &self.base
    }

    pub fn config_for(&self, index: u32) -> Result<&GradientSpec> {
        self.range.check(index)?;
        Ok(self.overrides.get(&index).unwrap_or(&self.base))
    }
}
