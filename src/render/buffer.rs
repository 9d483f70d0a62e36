use serde::{Deserialize, Serialize};

use crate::foundation::core::PremulRgba8;
use crate::foundation::error::{DeviceError, DeviceResult};
use crate::render::FrameRGBA;
use crate::render::composite::{CompositeOp, blend_span_op, over_span};

/// Byte layout of a render buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelLayout {
    /// Four bytes per pixel, premultiplied RGBA.
    #[default]
    Rgba8Premul,
    /// Three bytes per pixel, opaque RGB. Alpha reads back as 255.
    Rgb8,
}

impl PixelLayout {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8Premul => 4,
            Self::Rgb8 => 3,
        }
    }
}

/// Front-end used to write a span into a buffer.
///
/// `Normal` is the source-over fast path. `Blend` carries an explicit operator and is only
/// selected when the operator is something other than source-over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Renderer {
    Normal,
    Blend(CompositeOp),
}

impl Renderer {
    pub fn for_op(op: CompositeOp) -> Self {
        match op {
            CompositeOp::Over => Self::Normal,
            other => Self::Blend(other),
        }
    }
}

/// Owned pixel buffer backing the main surface and every offscreen target.
#[derive(Clone, Debug)]
pub struct RenderBuffer {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl RenderBuffer {
    /// Allocate a transparent buffer. Dimensions must fit the rasterizer (`1..=65535`).
    pub fn new(width: u32, height: u32, layout: PixelLayout) -> DeviceResult<Self> {
        if width == 0 || height == 0 {
            return Err(DeviceError::validation(format!(
                "buffer dimensions must be non-zero, got {width}x{height}"
            )));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(DeviceError::validation(format!(
                "buffer dimensions exceed u16: {width}x{height}"
            )));
        }

        let len = Self::byte_len_for(width, height, layout);
        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|e| {
            DeviceError::allocation(format!(
                "failed to allocate {width}x{height} {layout:?} buffer ({len} bytes): {e}"
            ))
        })?;
        data.resize(len, 0);

        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Wrap existing pixel bytes laid out as `layout`.
    pub fn from_data(
        width: u32,
        height: u32,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> DeviceResult<Self> {
        let max = u32::from(u16::MAX);
        if width == 0 || height == 0 || width > max || height > max {
            return Err(DeviceError::validation(format!(
                "invalid buffer dimensions {width}x{height}"
            )));
        }
        let expected = Self::byte_len_for(width, height, layout);
        if data.len() != expected {
            return Err(DeviceError::validation(format!(
                "pixel data has {} bytes, expected {expected} for {width}x{height} {layout:?}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    pub fn byte_len_for(width: u32, height: u32, layout: PixelLayout) -> usize {
        (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(layout.bytes_per_pixel())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + (x as usize)) * self.layout.bytes_per_pixel()
    }

    pub fn clear(&mut self, color: PremulRgba8) {
        match self.layout {
            PixelLayout::Rgba8Premul => {
                let px = color.to_array();
                for chunk in self.data.chunks_exact_mut(4) {
                    chunk.copy_from_slice(&px);
                }
            }
            PixelLayout::Rgb8 => {
                let px = [color.r, color.g, color.b];
                for chunk in self.data.chunks_exact_mut(3) {
                    chunk.copy_from_slice(&px);
                }
            }
        }
    }

    /// Premultiplied pixel at `(x, y)`. Out-of-bounds reads are transparent.
    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        if x >= self.width || y >= self.height {
            return PremulRgba8::TRANSPARENT;
        }
        let i = self.offset(x, y);
        let d = &self.data;
        match self.layout {
            PixelLayout::Rgba8Premul => {
                PremulRgba8::from_array([d[i], d[i + 1], d[i + 2], d[i + 3]])
            }
            PixelLayout::Rgb8 => PremulRgba8::from_array([d[i], d[i + 1], d[i + 2], 255]),
        }
    }

    fn store(&mut self, x: u32, y: u32, c: PremulRgba8) {
        let i = self.offset(x, y);
        match self.layout {
            PixelLayout::Rgba8Premul => self.data[i..i + 4].copy_from_slice(&c.to_array()),
            PixelLayout::Rgb8 => self.data[i..i + 3].copy_from_slice(&[c.r, c.g, c.b]),
        }
    }

    /// Copy `src` into this buffer, converting between layouts when they differ.
    pub fn copy_from(&mut self, src: &RenderBuffer) -> DeviceResult<()> {
        if src.width != self.width || src.height != self.height {
            return Err(DeviceError::render(format!(
                "copy_from size mismatch: {}x{} into {}x{}",
                src.width, src.height, self.width, self.height
            )));
        }
        if src.layout == self.layout {
            self.data.copy_from_slice(&src.data);
            return Ok(());
        }
        for y in 0..self.height {
            for x in 0..self.width {
                self.store(x, y, src.pixel(x, y));
            }
        }
        Ok(())
    }

    /// A copy of this buffer in `layout`.
    pub fn converted(&self, layout: PixelLayout) -> DeviceResult<RenderBuffer> {
        let mut out = RenderBuffer::new(self.width, self.height, layout)?;
        out.copy_from(self)?;
        Ok(out)
    }

    /// Write one horizontal span starting at `(x0, y)`. `covers` and `src` are parallel;
    /// anything past the right edge is dropped.
    pub fn blend_span(
        &mut self,
        y: u32,
        x0: u32,
        covers: &[u8],
        src: &[PremulRgba8],
        renderer: Renderer,
    ) {
        if y >= self.height || x0 >= self.width {
            return;
        }
        let n = covers
            .len()
            .min(src.len())
            .min((self.width - x0) as usize);
        if n == 0 {
            return;
        }

        let mut dst: Vec<PremulRgba8> = (0..n as u32).map(|i| self.pixel(x0 + i, y)).collect();
        match renderer {
            Renderer::Normal => over_span(&mut dst, &src[..n], &covers[..n]),
            Renderer::Blend(op) => blend_span_op(op, &mut dst, &src[..n], &covers[..n]),
        }
        for (i, c) in dst.into_iter().enumerate() {
            if covers[i] != 0 {
                self.store(x0 + i as u32, y, c);
            }
        }
    }

    /// Straight-alpha RGBA8 copy of the buffer.
    pub fn to_frame(&self) -> FrameRGBA {
        let mut data = Vec::with_capacity((self.width as usize) * (self.height as usize) * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let px = self.pixel(x, y).to_straight();
                data.extend_from_slice(&[px.r, px.g, px.b, px.a]);
            }
        }
        FrameRGBA {
            width: self.width,
            height: self.height,
            data,
            premultiplied: false,
        }
    }
}

/// Retained-bytes accounting for offscreen buffers.
#[derive(Debug, Default, Clone)]
pub struct BufferStats {
    pub live_bytes: usize,
    pub peak_bytes: usize,
    pub alloc_buffers: u64,
    pub alloc_bytes: u64,
    pub rejected: u64,
}

/// Byte budget shared by every offscreen buffer a device owns.
#[derive(Debug, Clone)]
pub(crate) struct BufferBudget {
    max_bytes: usize,
    stats: BufferStats,
}

impl BufferBudget {
    pub(crate) fn new(max_bytes: usize) -> Self {
        Self {
            max_bytes,
            stats: BufferStats::default(),
        }
    }

    pub(crate) fn stats(&self) -> BufferStats {
        self.stats.clone()
    }

    /// Allocate an offscreen buffer charged against the budget.
    pub(crate) fn allocate(
        &mut self,
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> DeviceResult<RenderBuffer> {
        let bytes = RenderBuffer::byte_len_for(width, height, layout);
        let wanted = self.stats.live_bytes.saturating_add(bytes);
        if wanted > self.max_bytes {
            self.stats.rejected = self.stats.rejected.saturating_add(1);
            return Err(DeviceError::allocation(format!(
                "offscreen budget exhausted: {wanted} bytes requested, limit {}",
                self.max_bytes
            )));
        }
        let buf = RenderBuffer::new(width, height, layout)?;

        self.stats.live_bytes = wanted;
        self.stats.peak_bytes = self.stats.peak_bytes.max(wanted);
        self.stats.alloc_buffers = self.stats.alloc_buffers.saturating_add(1);
        self.stats.alloc_bytes = self.stats.alloc_bytes.saturating_add(bytes as u64);
        Ok(buf)
    }

    pub(crate) fn release(&mut self, bytes: usize) {
        self.stats.live_bytes = self.stats.live_bytes.saturating_sub(bytes);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/buffer.rs"]
mod tests;
