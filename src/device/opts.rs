use serde::{Deserialize, Serialize};

use crate::foundation::core::Rgba8;
use crate::foundation::error::{DeviceError, DeviceResult};
use crate::render::buffer::PixelLayout;

const DEFAULT_MAX_OFFSCREEN_BYTES: usize = 512 * 1024 * 1024;

/// Device configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceOpts {
    pub width: u32,
    pub height: u32,
    /// Page background, used when a new page does not bring a visible color.
    pub background: Rgba8,
    /// Layout of the main surface and tile buffers. Masks and groups are always RGBA.
    pub layout: PixelLayout,
    /// Pixels per inch.
    pub resolution: f64,
    pub scaling: f64,
    /// Upper bound for the bytes held by all live offscreen buffers.
    pub max_offscreen_bytes: usize,
}

impl Default for DeviceOpts {
    fn default() -> Self {
        Self {
            width: 480,
            height: 480,
            background: Rgba8::WHITE,
            layout: PixelLayout::Rgba8Premul,
            resolution: 72.0,
            scaling: 1.0,
            max_offscreen_bytes: DEFAULT_MAX_OFFSCREEN_BYTES,
        }
    }
}

impl DeviceOpts {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, background: Rgba8) -> Self {
        self.background = background;
        self
    }

    pub fn with_layout(mut self, layout: PixelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_resolution(mut self, resolution: f64) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_scaling(mut self, scaling: f64) -> Self {
        self.scaling = scaling;
        self
    }

    pub fn with_max_offscreen_bytes(mut self, bytes: usize) -> Self {
        self.max_offscreen_bytes = bytes;
        self
    }

    /// Apply `PIXDEV_MAX_OFFSCREEN_BYTES` when it holds a positive integer.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(bytes) = std::env::var("PIXDEV_MAX_OFFSCREEN_BYTES")
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            self.max_offscreen_bytes = bytes;
        }
        self
    }

    /// Factor applied to host line widths (1/96 inch units) to get device pixels.
    pub fn line_width_scale(&self) -> f64 {
        self.scaling * self.resolution / 96.0
    }

    pub fn validate(&self) -> DeviceResult<()> {
        let max = u32::from(u16::MAX);
        if self.width == 0 || self.height == 0 || self.width > max || self.height > max {
            return Err(DeviceError::validation(format!(
                "device size must be within 1..={max}, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.resolution.is_finite() && self.resolution > 0.0) {
            return Err(DeviceError::validation(format!(
                "resolution must be positive, got {}",
                self.resolution
            )));
        }
        if !(self.scaling.is_finite() && self.scaling > 0.0) {
            return Err(DeviceError::validation(format!(
                "scaling must be positive, got {}",
                self.scaling
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/device/opts.rs"]
mod tests;
