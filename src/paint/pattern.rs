use serde::{Deserialize, Serialize};

use crate::foundation::core::{Point, PremulRgba8, Rgba8, Vec2};
use crate::foundation::error::DeviceResult;
use crate::paint::gradient::{ColorLut, ColorStop, GradientShape, LUT_SIZE};
use crate::render::buffer::{PixelLayout, RenderBuffer};
use crate::render::sample::{Wrap, sample_bilinear};

/// Policy for sampling a pattern outside its defined domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtendMode {
    /// Clamp to the edge color.
    #[default]
    Pad,
    /// Periodic.
    Repeat,
    /// Mirrored period.
    Reflect,
    /// Transparent outside the defined range.
    None,
}

impl ExtendMode {
    pub const ALL: [ExtendMode; 4] = [Self::Pad, Self::Repeat, Self::Reflect, Self::None];

    pub fn name(self) -> &'static str {
        match self {
            Self::Pad => "pad",
            Self::Repeat => "repeat",
            Self::Reflect => "reflect",
            Self::None => "none",
        }
    }

    fn wrap(self) -> Wrap {
        match self {
            Self::Pad => Wrap::Clamp,
            Self::Repeat => Wrap::Repeat,
            Self::Reflect => Wrap::Reflect,
            Self::None => Wrap::Transparent,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    LinearGradient,
    RadialGradient,
    Tile,
}

/// Host-side description of a pattern to create.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternDesc {
    Linear {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        #[serde(default)]
        stops: Vec<ColorStop>,
        #[serde(default)]
        extend: ExtendMode,
    },
    Radial {
        cx1: f64,
        cy1: f64,
        r1: f64,
        cx2: f64,
        cy2: f64,
        r2: f64,
        #[serde(default)]
        stops: Vec<ColorStop>,
        #[serde(default)]
        extend: ExtendMode,
    },
    /// A `width x height` tile whose top-left corner sits at `(x, y)` in device space.
    Tile {
        width: u32,
        height: u32,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        extend: ExtendMode,
    },
}

impl PatternDesc {
    pub fn kind(&self) -> PatternKind {
        match self {
            Self::Linear { .. } => PatternKind::LinearGradient,
            Self::Radial { .. } => PatternKind::RadialGradient,
            Self::Tile { .. } => PatternKind::Tile,
        }
    }
}

#[derive(Clone, Debug)]
enum Source {
    Gradient {
        shape: GradientShape,
        stops: Vec<ColorStop>,
        lut: Option<ColorLut>,
    },
    Tile {
        buffer: RenderBuffer,
        origin: Point,
    },
}

/// A gradient or tile paint source.
#[derive(Clone, Debug)]
pub struct Pattern {
    kind: PatternKind,
    extend: ExtendMode,
    source: Source,
}

impl Pattern {
    pub fn linear(p1: Point, p2: Point, extend: ExtendMode) -> Self {
        Self {
            kind: PatternKind::LinearGradient,
            extend,
            source: Source::Gradient {
                shape: GradientShape::linear(p1, p2),
                stops: Vec::new(),
                lut: None,
            },
        }
    }

    pub fn radial(c1: Point, r1: f64, c2: Point, r2: f64, extend: ExtendMode) -> Self {
        Self {
            kind: PatternKind::RadialGradient,
            extend,
            source: Source::Gradient {
                shape: GradientShape::radial(c1, r1, c2, r2),
                stops: Vec::new(),
                lut: None,
            },
        }
    }

    /// Wrap an already allocated tile buffer whose top-left corner maps to `origin`.
    pub fn tile(buffer: RenderBuffer, origin: Point, extend: ExtendMode) -> Self {
        Self {
            kind: PatternKind::Tile,
            extend,
            source: Source::Tile { buffer, origin },
        }
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn extend(&self) -> ExtendMode {
        self.extend
    }

    pub fn is_gradient(&self) -> bool {
        self.kind != PatternKind::Tile
    }

    /// Add a color stop. Ignored for tiles. Invalidates a previously baked table.
    pub fn add_stop(&mut self, offset: f32, color: Rgba8) {
        if let Source::Gradient { stops, lut, .. } = &mut self.source {
            stops.push(ColorStop::new(offset, color));
            *lut = None;
        }
    }

    /// Bake the stops into the lookup table.
    pub fn finish(&mut self) {
        if let Source::Gradient { stops, lut, .. } = &mut self.source {
            *lut = Some(ColorLut::build(stops));
        }
    }

    /// Bytes held by offscreen buffers owned by this pattern.
    pub fn byte_len(&self) -> usize {
        match &self.source {
            Source::Tile { buffer, .. } => buffer.byte_len(),
            Source::Gradient { .. } => 0,
        }
    }

    pub(crate) fn tile_buffer_mut(&mut self) -> Option<&mut RenderBuffer> {
        match &mut self.source {
            Source::Tile { buffer, .. } => Some(buffer),
            Source::Gradient { .. } => None,
        }
    }

    pub fn tile_buffer(&self) -> Option<&RenderBuffer> {
        match &self.source {
            Source::Tile { buffer, .. } => Some(buffer),
            Source::Gradient { .. } => None,
        }
    }

    /// Device-space position of the tile's top-left corner.
    pub fn tile_origin(&self) -> Option<Point> {
        match &self.source {
            Source::Tile { origin, .. } => Some(*origin),
            Source::Gradient { .. } => None,
        }
    }

    /// Color at device point `(x, y)`.
    pub fn color_at(&self, x: f64, y: f64) -> PremulRgba8 {
        let p = Point::new(x, y);
        match &self.source {
            Source::Gradient { shape, stops, lut } => match lut {
                Some(lut) => gradient_color(shape, lut, self.extend, p),
                None => gradient_color(shape, &ColorLut::build(stops), self.extend, p),
            },
            Source::Tile { buffer, origin } => {
                let q = p - origin.to_vec2();
                sample_bilinear(buffer, q.x, q.y, self.extend.wrap())
            }
        }
    }

    /// Colors for `len` pixels starting at `(x0, y)`, sampled at pixel centres.
    ///
    /// `translation` is the current device translation; it is removed before sampling so a
    /// pattern keeps its device-space placement inside translated recordings.
    pub fn fill_span(
        &self,
        y: u32,
        x0: u32,
        len: usize,
        translation: Vec2,
        out: &mut Vec<PremulRgba8>,
    ) {
        out.clear();
        let py = f64::from(y) + 0.5 - translation.y;
        let baked;
        let lut = match &self.source {
            Source::Gradient {
                lut: Some(lut), ..
            } => Some(lut),
            Source::Gradient { stops, .. } => {
                baked = ColorLut::build(stops);
                Some(&baked)
            }
            Source::Tile { .. } => None,
        };

        for i in 0..len {
            let px = f64::from(x0) + i as f64 + 0.5 - translation.x;
            let c = match (&self.source, lut) {
                (Source::Gradient { shape, .. }, Some(lut)) => {
                    gradient_color(shape, lut, self.extend, Point::new(px, py))
                }
                (Source::Tile { buffer, origin }, _) => sample_bilinear(
                    buffer,
                    px - origin.x,
                    py - origin.y,
                    self.extend.wrap(),
                ),
                _ => PremulRgba8::TRANSPARENT,
            };
            out.push(c);
        }
    }

    /// An equivalent pattern whose tile buffer is in the premultiplied RGBA layout used by
    /// mask and group buffers. Gradients are already layout independent.
    pub fn convert_for_mask(&self) -> DeviceResult<Pattern> {
        let source = match &self.source {
            Source::Tile { buffer, origin } => Source::Tile {
                buffer: buffer.converted(PixelLayout::Rgba8Premul)?,
                origin: *origin,
            },
            gradient => gradient.clone(),
        };
        Ok(Self {
            kind: self.kind,
            extend: self.extend,
            source,
        })
    }
}

fn gradient_color(
    shape: &GradientShape,
    lut: &ColorLut,
    extend: ExtendMode,
    p: Point,
) -> PremulRgba8 {
    let Some(t) = shape.distance(p) else {
        return lut.last();
    };
    if !t.is_finite() {
        return PremulRgba8::TRANSPARENT;
    }
    let d = shape.extent();
    let t = match extend {
        ExtendMode::Pad => t.clamp(0.0, d),
        ExtendMode::Repeat => t.rem_euclid(d),
        ExtendMode::Reflect => {
            let m = t.rem_euclid(2.0 * d);
            if m >= d { 2.0 * d - m } else { m }
        }
        ExtendMode::None => {
            if t < 0.0 || t > d {
                return PremulRgba8::TRANSPARENT;
            }
            t
        }
    };
    let index = ((t * LUT_SIZE as f64) / d).floor().max(0.0) as usize;
    lut.lookup(index)
}

#[cfg(test)]
#[path = "../../tests/unit/paint/pattern.rs"]
mod tests;
