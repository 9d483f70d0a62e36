use serde::{Deserialize, Serialize};

use crate::foundation::core::{Affine, Point, PremulRgba8, Rgba8, Vec2};

/// Number of precomputed colors per gradient.
pub const LUT_SIZE: usize = 512;

const EPSILON: f64 = 1e-9;

/// A `(position, color)` pair; positions outside `[0, 1]` are clamped when baked.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Rgba8,
}

impl ColorStop {
    pub fn new(offset: f32, color: Rgba8) -> Self {
        Self { offset, color }
    }
}

/// Stops baked into a fixed-size premultiplied lookup table.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorLut {
    entries: Vec<PremulRgba8>,
}

impl ColorLut {
    /// Interpolates straight colors between stops and premultiplies each entry.
    /// No stops gives a transparent table; one stop gives a flat one.
    pub fn build(stops: &[ColorStop]) -> Self {
        let mut sorted: Vec<ColorStop> = stops
            .iter()
            .map(|s| ColorStop::new(s.offset.clamp(0.0, 1.0), s.color))
            .collect();
        sorted.sort_by(|a, b| a.offset.total_cmp(&b.offset));

        let entries = match sorted.as_slice() {
            [] => vec![PremulRgba8::TRANSPARENT; LUT_SIZE],
            [only] => vec![only.color.premultiply(); LUT_SIZE],
            _ => (0..LUT_SIZE)
                .map(|i| {
                    let t = i as f32 / (LUT_SIZE - 1) as f32;
                    interpolate(&sorted, t).premultiply()
                })
                .collect(),
        };
        Self { entries }
    }

    pub fn lookup(&self, index: usize) -> PremulRgba8 {
        self.entries[index.min(LUT_SIZE - 1)]
    }

    pub fn last(&self) -> PremulRgba8 {
        self.lookup(LUT_SIZE - 1)
    }
}

fn interpolate(stops: &[ColorStop], t: f32) -> Rgba8 {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Rgba8::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    for w in stops.windows(2) {
        let (a, b) = (w[0], w[1]);
        if t >= a.offset && t <= b.offset {
            let span = b.offset - a.offset;
            if span <= f32::EPSILON {
                return b.color;
            }
            let k = (t - a.offset) / span;
            let mix = |x: u8, y: u8| -> u8 {
                (f32::from(x) + (f32::from(y) - f32::from(x)) * k)
                    .round()
                    .clamp(0.0, 255.0) as u8
            };
            return Rgba8::new(
                mix(a.color.r, b.color.r),
                mix(a.color.g, b.color.g),
                mix(a.color.b, b.color.b),
                mix(a.color.a, b.color.a),
            );
        }
    }
    last.color
}

/// Geometry of a gradient in its own canonical space.
///
/// `transform` maps device coordinates into that space; [`GradientShape::distance`] then
/// yields the parameter `t`, whose defined range is `[0, extent]`.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientShape {
    transform: Affine,
    extent: f64,
    kind: ShapeKind,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ShapeKind {
    /// Parameter is the x coordinate after rotating the axis onto +x.
    Linear,
    /// Focal radial: `r` is the outer radius, `focus` is relative to the outer centre and
    /// `inner` is the radius subtracted from the focal distance. `reversed` shapes were
    /// built with the circles swapped and measure `t` back from the outer circle.
    Radial {
        r: f64,
        focus: Vec2,
        inner: f64,
        reversed: bool,
    },
    /// Zero-length axis or zero radius difference.
    Flat,
}

impl GradientShape {
    pub fn linear(p1: Point, p2: Point) -> Self {
        let d = p2 - p1;
        let len = d.hypot();
        if !(len.is_finite() && len > EPSILON) {
            return Self::flat();
        }
        let to_axis = Affine::translate(p1.to_vec2()) * Affine::rotate(d.y.atan2(d.x));
        Self {
            transform: to_axis.inverse(),
            extent: len,
            kind: ShapeKind::Linear,
        }
    }

    /// Gradient from the circle `(c1, r1)` to the circle `(c2, r2)`.
    ///
    /// The smaller circle acts as the focus. When `r1 > r2` the geometry is built from the
    /// swapped circles and `t` is mirrored, so `t = 0` stays on the first circle.
    pub fn radial(c1: Point, r1: f64, c2: Point, r2: f64) -> Self {
        let r1 = r1.abs();
        let r2 = r2.abs();
        let extent = r2 - r1;
        if !(extent.is_finite() && extent.abs() > EPSILON) {
            return Self::flat();
        }
        if extent < 0.0 {
            let mut shape = Self::focal(c2, r2, c1, r1);
            if let ShapeKind::Radial { reversed, .. } = &mut shape.kind {
                *reversed = true;
            }
            return shape;
        }
        Self::focal(c1, r1, c2, r2)
    }

    /// Focal radial from the inner circle `(c1, r1)` out to `(c2, r2)`, with `r2 > r1`.
    fn focal(c1: Point, r1: f64, c2: Point, r2: f64) -> Self {
        let extent = r2 - r1;

        // Keep the focus strictly inside the outer circle.
        let mut focus = c1 - c2;
        let max_focus = r2 * 0.999;
        if focus.hypot() > max_focus {
            focus = focus.normalize() * max_focus;
        }

        Self {
            transform: Affine::translate(c2.to_vec2()).inverse(),
            extent,
            kind: ShapeKind::Radial {
                r: r2,
                focus,
                inner: r1,
                reversed: false,
            },
        }
    }

    pub fn flat() -> Self {
        Self {
            transform: Affine::IDENTITY,
            extent: 0.0,
            kind: ShapeKind::Flat,
        }
    }

    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Gradient parameter at device point `p`, or `None` for flat gradients.
    pub fn distance(&self, p: Point) -> Option<f64> {
        let q = self.transform * p;
        match self.kind {
            ShapeKind::Flat => None,
            ShapeKind::Linear => Some(q.x),
            ShapeKind::Radial {
                r,
                focus,
                inner,
                reversed,
            } => {
                let dx = q.x - focus.x;
                let dy = q.y - focus.y;
                let cross = dx * focus.y - dy * focus.x;
                let disc = r * r * (dx * dx + dy * dy) - cross * cross;
                let denom = r * r - focus.hypot2();
                let d = (dx * focus.x + dy * focus.y + disc.abs().sqrt()) * r / denom;
                let t = d - inner;
                Some(if reversed { self.extent - t } else { t })
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/paint/gradient.rs"]
mod tests;
