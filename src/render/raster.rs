use kurbo::Shape;

use crate::foundation::core::{BezPath, FillRule, Rect};
use crate::foundation::error::{DeviceError, DeviceResult};
use crate::foundation::math::mul_div255_u8;

/// Integer pixel rectangle, half-open on the right and bottom edges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub const EMPTY: Self = Self {
        x0: 0,
        y0: 0,
        x1: 0,
        y1: 0,
    };

    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn surface(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Round `r` outward to whole pixels and clamp it to `limit`.
    pub fn from_rect(r: Rect, limit: PixelRect) -> Self {
        if !(r.x0.is_finite() && r.y0.is_finite() && r.x1.is_finite() && r.y1.is_finite()) {
            return Self::EMPTY;
        }
        let r = r.abs();
        let clamp =
            |v: f64, lo: u32, hi: u32| -> u32 { v.clamp(f64::from(lo), f64::from(hi)) as u32 };
        Self {
            x0: clamp(r.x0.floor(), limit.x0, limit.x1),
            y0: clamp(r.y0.floor(), limit.y0, limit.y1),
            x1: clamp(r.x1.ceil(), limit.x0, limit.x1),
            y1: clamp(r.y1.ceil(), limit.y0, limit.y1),
        }
    }

    pub fn intersect(self, other: PixelRect) -> Self {
        let out = Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        if out.is_empty() { Self::EMPTY } else { out }
    }

    pub fn is_empty(self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    pub fn width(self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn contains(self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(
            f64::from(self.x0),
            f64::from(self.y0),
            f64::from(self.x1),
            f64::from(self.y1),
        )
    }
}

/// Anti-aliased coverage (0..=255) over a pixel rectangle. Pixels outside `bounds` are 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coverage {
    bounds: PixelRect,
    data: Vec<u8>,
}

/// One row of non-zero coverage.
#[derive(Debug, Clone, Copy)]
pub struct Span<'a> {
    pub y: u32,
    pub x0: u32,
    pub covers: &'a [u8],
}

impl Coverage {
    pub fn empty() -> Self {
        Self {
            bounds: PixelRect::EMPTY,
            data: Vec::new(),
        }
    }

    /// Full coverage over `bounds`.
    pub fn full(bounds: PixelRect) -> Self {
        if bounds.is_empty() {
            return Self::empty();
        }
        let len = (bounds.width() as usize) * (bounds.height() as usize);
        Self {
            bounds,
            data: vec![255; len],
        }
    }

    pub(crate) fn from_alpha(bounds: PixelRect, data: Vec<u8>) -> DeviceResult<Self> {
        let len = (bounds.width() as usize) * (bounds.height() as usize);
        if data.len() != len {
            return Err(DeviceError::render(format!(
                "coverage size mismatch: {} bytes for {}x{}",
                data.len(),
                bounds.width(),
                bounds.height()
            )));
        }
        Ok(Self { bounds, data })
    }

    pub fn bounds(&self) -> PixelRect {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty() || self.data.iter().all(|&c| c == 0)
    }

    pub fn value(&self, x: u32, y: u32) -> u8 {
        if !self.bounds.contains(x, y) {
            return 0;
        }
        let i = ((y - self.bounds.y0) as usize) * (self.bounds.width() as usize)
            + (x - self.bounds.x0) as usize;
        self.data[i]
    }

    fn row(&self, y: u32) -> &[u8] {
        let w = self.bounds.width() as usize;
        let start = ((y - self.bounds.y0) as usize) * w;
        &self.data[start..start + w]
    }

    /// Boolean AND of two coverages (per-pixel product).
    pub fn intersect(&mut self, other: &Coverage) {
        let bounds = self.bounds.intersect(other.bounds);
        if bounds.is_empty() {
            *self = Self::empty();
            return;
        }
        let mut data = Vec::with_capacity((bounds.width() as usize) * (bounds.height() as usize));
        for y in bounds.y0..bounds.y1 {
            for x in bounds.x0..bounds.x1 {
                let a = u16::from(self.value(x, y));
                let b = u16::from(other.value(x, y));
                data.push(mul_div255_u8(a, b));
            }
        }
        self.bounds = bounds;
        self.data = data;
    }

    /// Drop coverage outside `rect`.
    pub fn clip_to_rect(&mut self, rect: PixelRect) {
        let bounds = self.bounds.intersect(rect);
        if bounds == self.bounds {
            return;
        }
        if bounds.is_empty() {
            *self = Self::empty();
            return;
        }
        let mut data = Vec::with_capacity((bounds.width() as usize) * (bounds.height() as usize));
        for y in bounds.y0..bounds.y1 {
            let row = self.row(y);
            let from = (bounds.x0 - self.bounds.x0) as usize;
            data.extend_from_slice(&row[from..from + bounds.width() as usize]);
        }
        self.bounds = bounds;
        self.data = data;
    }

    /// Rows with their leading and trailing zero coverage trimmed.
    pub fn spans(&self) -> impl Iterator<Item = Span<'_>> + '_ {
        let rows = if self.bounds.is_empty() {
            0..0
        } else {
            self.bounds.y0..self.bounds.y1
        };
        rows.filter_map(move |y| {
            let row = self.row(y);
            let first = row.iter().position(|&c| c != 0)?;
            let last = row.iter().rposition(|&c| c != 0)?;
            Some(Span {
                y,
                x0: self.bounds.x0 + first as u32,
                covers: &row[first..=last],
            })
        })
    }
}

/// Scanline conversion of a path into coverage.
pub trait Rasterizer {
    /// Coverage of `path` under `rule`, restricted to `limit`.
    fn rasterize(
        &mut self,
        path: &BezPath,
        rule: FillRule,
        limit: PixelRect,
    ) -> DeviceResult<Coverage>;
}

/// [`Rasterizer`] backed by `vello_cpu`: the path is filled in opaque white and the alpha
/// channel of the result is the coverage.
#[derive(Default)]
pub struct VelloRasterizer {
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: Option<vello_cpu::Pixmap>,
}

impl std::fmt::Debug for VelloRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VelloRasterizer")
            .field("has_ctx", &self.ctx.is_some())
            .finish()
    }
}

impl VelloRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext, &mut vello_cpu::Pixmap) -> R,
    ) -> R {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let mut pixmap = match self.pixmap.take() {
            Some(p) if p.width() == width && p.height() == height => p,
            _ => vello_cpu::Pixmap::new(width, height),
        };
        pixmap.data_as_u8_slice_mut().fill(0);

        let out = f(&mut ctx, &mut pixmap);
        self.ctx = Some(ctx);
        self.pixmap = Some(pixmap);
        out
    }
}

impl Rasterizer for VelloRasterizer {
    fn rasterize(
        &mut self,
        path: &BezPath,
        rule: FillRule,
        limit: PixelRect,
    ) -> DeviceResult<Coverage> {
        if path.elements().is_empty() {
            return Ok(Coverage::empty());
        }
        let area = PixelRect::from_rect(path.bounding_box(), limit);
        if area.is_empty() {
            return Ok(Coverage::empty());
        }
        let w: u16 = area
            .width()
            .try_into()
            .map_err(|_| DeviceError::render("raster width exceeds u16"))?;
        let h: u16 = area
            .height()
            .try_into()
            .map_err(|_| DeviceError::render("raster height exceeds u16"))?;

        let cpu_path = bezpath_to_cpu(path);
        let alpha = self.with_ctx_mut(w, h, |ctx, pixmap| {
            ctx.set_transform(vello_cpu::kurbo::Affine::translate((
                -f64::from(area.x0),
                -f64::from(area.y0),
            )));
            ctx.set_fill_rule(match rule {
                FillRule::NonZero => vello_cpu::peniko::Fill::NonZero,
                FillRule::EvenOdd => vello_cpu::peniko::Fill::EvenOdd,
            });
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
            ctx.fill_path(&cpu_path);
            ctx.flush();
            ctx.render_to_pixmap(pixmap);
            pixmap
                .data_as_u8_slice()
                .chunks_exact(4)
                .map(|px| px[3])
                .collect::<Vec<u8>>()
        });

        Coverage::from_alpha(area, alpha)
    }
}

pub(crate) fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let pt = |p: kurbo::Point| vello_cpu::kurbo::Point::new(p.x, p.y);
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(pt(p)),
            PathEl::LineTo(p) => out.line_to(pt(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(pt(p1), pt(p2)),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(pt(p1), pt(p2), pt(p3)),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
