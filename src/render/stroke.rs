use serde::{Deserialize, Serialize};

use crate::foundation::core::BezPath;

const STROKE_TOLERANCE: f64 = 0.1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    #[default]
    Round,
    Butt,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    #[default]
    Round,
    Miter,
    Bevel,
}

/// Packed dash pattern: each hex nibble, read from the low end in `(dash, gap)` pairs, is a
/// segment length in line widths. Up to four pairs. `0` is solid, `-1` draws nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineType(pub i32);

impl LineType {
    pub const SOLID: Self = Self(0);
    pub const BLANK: Self = Self(-1);

    pub fn is_blank(self) -> bool {
        self == Self::BLANK
    }

    pub fn is_solid(self) -> bool {
        self == Self::SOLID
    }

    /// Dash lengths for a line of width `lwd`.
    pub fn dashes(self, lwd: f64) -> Vec<f64> {
        if self.is_solid() || self.is_blank() {
            return Vec::new();
        }
        let mut lty = self.0 as u32;
        let mut out = Vec::with_capacity(8);
        for _ in 0..4 {
            if lty & 15 == 0 {
                break;
            }
            let dash = f64::from(lty & 15) * lwd;
            lty >>= 4;
            let gap = f64::from(lty & 15) * lwd;
            lty >>= 4;
            out.push(dash);
            out.push(gap);
        }
        out
    }
}

/// Stroke parameters for one draw call. `width` is in device pixels, already scaled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    pub line_type: LineType,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Round,
            join: LineJoin::Round,
            miter_limit: 10.0,
            line_type: LineType::SOLID,
        }
    }
}

impl StrokeStyle {
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    pub fn with_line_type(mut self, line_type: LineType) -> Self {
        self.line_type = line_type;
        self
    }

    pub fn with_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    /// `false` when the stroke would not deposit any pixels.
    pub fn is_visible(&self) -> bool {
        self.width > 0.0 && self.width.is_finite() && !self.line_type.is_blank()
    }
}

/// Outline of `path` stroked with `style`, to be filled with the nonzero rule.
pub fn stroke_outline(path: &BezPath, style: &StrokeStyle) -> BezPath {
    if !style.is_visible() || path.elements().is_empty() {
        return BezPath::new();
    }

    let cap = match style.cap {
        LineCap::Round => kurbo::Cap::Round,
        LineCap::Butt => kurbo::Cap::Butt,
        LineCap::Square => kurbo::Cap::Square,
    };
    let join = match style.join {
        LineJoin::Round => kurbo::Join::Round,
        LineJoin::Miter => kurbo::Join::Miter,
        LineJoin::Bevel => kurbo::Join::Bevel,
    };

    let mut stroke = kurbo::Stroke::new(style.width)
        .with_caps(cap)
        .with_join(join)
        .with_miter_limit(style.miter_limit.max(1.0));
    let dashes = style.line_type.dashes(style.width);
    if !dashes.is_empty() {
        stroke = stroke.with_dashes(0.0, dashes);
    }

    kurbo::stroke(
        path.iter(),
        &stroke,
        &kurbo::StrokeOpts::default(),
        STROKE_TOLERANCE,
    )
}

#[cfg(test)]
#[path = "../../tests/unit/render/stroke.rs"]
mod tests;
