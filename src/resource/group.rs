use crate::foundation::core::PremulRgba8;
use crate::render::buffer::{RenderBuffer, Renderer};
use crate::render::composite::CompositeOp;

/// An offscreen compositing layer.
///
/// `dst` holds the composited result that [`crate::Device::use_group`] replays. Operators
/// that depend on the destination's uncovered area also own `src`, a capture buffer that
/// each draw call lands in before being blended onto `dst` over the full surface.
#[derive(Clone, Debug)]
pub struct Group {
    op: CompositeOp,
    dst: RenderBuffer,
    src: Option<RenderBuffer>,
}

impl Group {
    /// `src` must be supplied exactly when `op.requires_dst_clip()`.
    pub fn new(op: CompositeOp, dst: RenderBuffer, src: Option<RenderBuffer>) -> Self {
        Self { op, dst, src }
    }

    pub fn op(&self) -> CompositeOp {
        self.op
    }

    pub fn needs_capture(&self) -> bool {
        self.src.is_some()
    }

    pub fn destination(&self) -> &RenderBuffer {
        &self.dst
    }

    pub(crate) fn into_destination(self) -> RenderBuffer {
        self.dst
    }

    pub fn byte_len(&self) -> usize {
        self.dst.byte_len() + self.src.as_ref().map_or(0, RenderBuffer::byte_len)
    }

    /// Where source content is drawn, and with which renderer.
    pub(crate) fn capture_target(&mut self) -> (&mut RenderBuffer, Renderer) {
        match &mut self.src {
            Some(src) => (src, Renderer::Normal),
            None => (&mut self.dst, Renderer::for_op(self.op)),
        }
    }

    /// Composite the capture buffer onto the destination over the full surface, then clear
    /// it. A no-op for groups without a capture buffer.
    pub fn blend_capture(&mut self) {
        let Some(src) = &mut self.src else {
            return;
        };
        let renderer = Renderer::for_op(self.op);
        let width = self.dst.width().min(src.width());
        let covers = vec![255u8; width as usize];
        let mut row = Vec::with_capacity(width as usize);
        for y in 0..self.dst.height().min(src.height()) {
            row.clear();
            row.extend((0..width).map(|x| src.pixel(x, y)));
            self.dst.blend_span(y, 0, &covers, &row, renderer);
        }
        src.clear(PremulRgba8::TRANSPARENT);
    }

    /// Drop the capture buffer once recording is complete. Returns the bytes released.
    pub fn finish(&mut self) -> usize {
        self.src.take().map_or(0, |src| src.byte_len())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resource/group.rs"]
mod tests;
