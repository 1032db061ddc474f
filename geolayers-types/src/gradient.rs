use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// An ARGB color, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    /// Fully opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(255, r, g, b)
    }

    /// Packed `0xAARRGGBB` value, the layout most tile renderers expect.
    pub const fn to_argb_u32(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub const fn from_argb_u32(value: u32) -> Self {
        Self::argb(
            (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        )
    }
}

/// One stop of a gradient ramp: intensity position in `[0, 1]` and its color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub position: f32,
    pub color: Color,
}

impl ColorStop {
    pub const fn new(position: f32, color: Color) -> Self {
        Self { position, color }
    }
}

/// Tile-rendering parameters for one heatmap slice.
///
/// `opacity` is normalized to `[0, 1]`; the ramp covers `[0.0, 1.0]`
/// inclusive at both ends with strictly increasing positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradientSpec {
    /// Convolution radius in pixels
    pub radius: u32,
    pub opacity: f64,
    pub ramp: Vec<ColorStop>,
}

impl GradientSpec {
    pub fn new(radius: u32, opacity: f64, ramp: Vec<ColorStop>) -> Self {
        Self {
            radius,
            opacity,
            ramp,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.radius == 0 {
            return Err("Gradient radius must be greater than zero".to_string());
        }

        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(format!(
                "Gradient opacity must be within [0.0, 1.0], got: {}",
                self.opacity
            ));
        }

        if self.ramp.len() < 2 {
            return Err(format!(
                "Gradient ramp needs at least two stops, got: {}",
                self.ramp.len()
            ));
        }

        let first = self.ramp[0].position;
        let last = self.ramp[self.ramp.len() - 1].position;
        if first != 0.0 || last != 1.0 {
            return Err(format!(
                "Gradient ramp must span [0.0, 1.0], got: [{}, {}]",
                first, last
            ));
        }

        if self
            .ramp
            .windows(2)
            .any(|pair| pair[0].position.partial_cmp(&pair[1].position) != Some(Ordering::Less))
        {
            return Err("Gradient ramp positions must be strictly increasing".to_string());
        }

        Ok(())
    }
}
