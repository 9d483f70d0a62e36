use serde::{Deserialize, Serialize};

use crate::foundation::core::PremulRgba8;
use crate::foundation::math::{luminance_u8, mul_div255_u8};
use crate::render::buffer::RenderBuffer;

/// Which channel of a mask buffer becomes coverage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskMode {
    #[default]
    Alpha,
    Luminance,
}

impl MaskMode {
    pub const ALL: [MaskMode; 2] = [Self::Alpha, Self::Luminance];

    pub fn name(self) -> &'static str {
        match self {
            Self::Alpha => "alpha",
            Self::Luminance => "luminance",
        }
    }

    /// Coverage contributed by one mask pixel. Luminance reads the stored RGB only.
    pub fn value(self, px: PremulRgba8) -> u8 {
        match self {
            Self::Alpha => px.a,
            Self::Luminance => luminance_u8(px.r, px.g, px.b),
        }
    }
}

/// A recorded soft mask: a surface-sized RGBA buffer and the mode fixed at creation.
#[derive(Clone, Debug)]
pub struct Mask {
    mode: MaskMode,
    buffer: RenderBuffer,
}

impl Mask {
    pub fn new(buffer: RenderBuffer, mode: MaskMode) -> Self {
        Self { mode, buffer }
    }

    pub fn mode(&self) -> MaskMode {
        self.mode
    }

    pub fn buffer(&self) -> &RenderBuffer {
        &self.buffer
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut RenderBuffer {
        &mut self.buffer
    }

    pub fn byte_len(&self) -> usize {
        self.buffer.byte_len()
    }

    /// Mask coverage at target pixel `(x, y)`; zero outside the buffer.
    pub fn value(&self, x: u32, y: u32) -> u8 {
        self.mode.value(self.buffer.pixel(x, y))
    }

    /// Multiply a coverage span starting at `(x0, y)` by the mask.
    pub fn apply(&self, y: u32, x0: u32, covers: &mut [u8]) {
        for (i, c) in covers.iter_mut().enumerate() {
            if *c == 0 {
                continue;
            }
            let m = self.value(x0 + i as u32, y);
            *c = mul_div255_u8(u16::from(*c), u16::from(m));
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resource/mask.rs"]
mod tests;
