use serde::{Deserialize, Serialize};

use crate::foundation::core::PremulRgba8;
use crate::foundation::math::{add_sat_u8, mul_div255_u8};

/// Compositing operator applied when a source pixel meets a destination pixel.
///
/// The first thirteen are Porter-Duff operators on premultiplied values; the rest are
/// separable blend modes combined with source-over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeOp {
    Clear,
    Source,
    #[default]
    Over,
    In,
    Out,
    Atop,
    Dest,
    DestOver,
    DestIn,
    DestOut,
    DestAtop,
    Xor,
    Plus,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

impl CompositeOp {
    pub const ALL: [CompositeOp; 24] = [
        Self::Clear,
        Self::Source,
        Self::Over,
        Self::In,
        Self::Out,
        Self::Atop,
        Self::Dest,
        Self::DestOver,
        Self::DestIn,
        Self::DestOut,
        Self::DestAtop,
        Self::Xor,
        Self::Plus,
        Self::Multiply,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Source => "source",
            Self::Over => "over",
            Self::In => "in",
            Self::Out => "out",
            Self::Atop => "atop",
            Self::Dest => "dest",
            Self::DestOver => "dest_over",
            Self::DestIn => "dest_in",
            Self::DestOut => "dest_out",
            Self::DestAtop => "dest_atop",
            Self::Xor => "xor",
            Self::Plus => "plus",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color_dodge",
            Self::ColorBurn => "color_burn",
            Self::HardLight => "hard_light",
            Self::SoftLight => "soft_light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Operators whose result depends on where the destination has no content.
    ///
    /// A source shape only touches the pixels it covers, so these must be captured
    /// separately and blended over the full surface to clear uncovered destination.
    pub fn requires_dst_clip(self) -> bool {
        matches!(
            self,
            Self::Clear
                | Self::Source
                | Self::In
                | Self::Out
                | Self::Atop
                | Self::DestIn
                | Self::DestAtop
        )
    }
}

fn inv(a: u8) -> u16 {
    255 - u16::from(a)
}

fn scale(c: PremulRgba8, k: u16) -> PremulRgba8 {
    PremulRgba8 {
        r: mul_div255_u8(u16::from(c.r), k),
        g: mul_div255_u8(u16::from(c.g), k),
        b: mul_div255_u8(u16::from(c.b), k),
        a: mul_div255_u8(u16::from(c.a), k),
    }
}

fn add(a: PremulRgba8, b: PremulRgba8) -> PremulRgba8 {
    PremulRgba8 {
        r: add_sat_u8(a.r, b.r),
        g: add_sat_u8(a.g, b.g),
        b: add_sat_u8(a.b, b.b),
        a: add_sat_u8(a.a, b.a),
    }
}

/// `d + (r - d) * cov`.
fn lerp(d: PremulRgba8, r: PremulRgba8, cov: u8) -> PremulRgba8 {
    let k = u16::from(cov);
    let ik = 255 - k;
    let mix = |d: u8, r: u8| {
        add_sat_u8(
            mul_div255_u8(u16::from(d), ik),
            mul_div255_u8(u16::from(r), k),
        )
    };
    PremulRgba8 {
        r: mix(d.r, r.r),
        g: mix(d.g, r.g),
        b: mix(d.b, r.b),
        a: mix(d.a, r.a),
    }
}

pub(crate) fn over_px(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    if s.a == 255 {
        return s;
    }
    if s.a == 0 {
        return d;
    }
    add(s, scale(d, inv(s.a)))
}

fn pd_clear(_d: PremulRgba8, _s: PremulRgba8) -> PremulRgba8 {
    PremulRgba8::TRANSPARENT
}

fn pd_source(_d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    s
}

fn pd_in(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    scale(s, u16::from(d.a))
}

fn pd_out(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    scale(s, inv(d.a))
}

fn pd_atop(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    let mut out = add(scale(s, u16::from(d.a)), scale(d, inv(s.a)));
    out.a = d.a;
    out
}

fn pd_dest(d: PremulRgba8, _s: PremulRgba8) -> PremulRgba8 {
    d
}

fn pd_dest_over(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    over_px(s, d)
}

fn pd_dest_in(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    scale(d, u16::from(s.a))
}

fn pd_dest_out(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    scale(d, inv(s.a))
}

fn pd_dest_atop(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    let mut out = add(scale(d, u16::from(s.a)), scale(s, inv(d.a)));
    out.a = s.a;
    out
}

fn pd_xor(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    add(scale(s, inv(d.a)), scale(d, inv(s.a)))
}

fn pd_plus(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    add(s, d)
}

/// Source-over with `blend_fn` applied to unpremultiplied channels:
/// `out_p = sp * (1 - da) + dp * (1 - sa) + B(sc, dc) * sa * da`.
#[inline(always)]
fn separable<F>(d: PremulRgba8, s: PremulRgba8, blend_fn: F) -> PremulRgba8
where
    F: Fn(f32, f32) -> f32,
{
    if s.a == 0 {
        return d;
    }
    let sa = f32::from(s.a) / 255.0;
    let da = f32::from(d.a) / 255.0;
    let out_a = (sa + da * (1.0 - sa)).clamp(0.0, 1.0);

    let channel = |sp: u8, dp: u8| -> u8 {
        let sp = f32::from(sp) / 255.0;
        let dp = f32::from(dp) / 255.0;
        let sc = if sa > 0.0 { (sp / sa).clamp(0.0, 1.0) } else { 0.0 };
        let dc = if da > 0.0 { (dp / da).clamp(0.0, 1.0) } else { 0.0 };
        let b = blend_fn(sc, dc).clamp(0.0, 1.0);
        let out = (sp * (1.0 - da) + dp * (1.0 - sa) + b * sa * da).clamp(0.0, 1.0);
        (out * 255.0).round() as u8
    };

    PremulRgba8 {
        r: channel(s.r, d.r),
        g: channel(s.g, d.g),
        b: channel(s.b, d.b),
        a: (out_a * 255.0).round() as u8,
    }
}

fn blend_multiply(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    separable(d, s, |s, d| s * d)
}

fn blend_screen(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    separable(d, s, |s, d| s + d - s * d)
}

fn blend_overlay(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    separable(d, s, |s, d| {
        if d <= 0.5 {
            2.0 * s * d
        } else {
            1.0 - 2.0 * (1.0 - s) * (1.0 - d)
        }
    })
}

fn blend_darken(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    separable(d, s, |s, d| s.min(d))
}

fn blend_lighten(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    separable(d, s, |s, d| s.max(d))
}

fn blend_color_dodge(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    separable(d, s, |s, d| {
        if s >= 1.0 {
            1.0
        } else {
            (d / (1.0 - s)).min(1.0)
        }
    })
}

fn blend_color_burn(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    separable(d, s, |s, d| {
        if s <= 0.0 {
            0.0
        } else {
            1.0 - ((1.0 - d) / s).min(1.0)
        }
    })
}

fn blend_hard_light(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    separable(d, s, |s, d| {
        if s <= 0.5 {
            2.0 * s * d
        } else {
            1.0 - 2.0 * (1.0 - s) * (1.0 - d)
        }
    })
}

fn blend_soft_light(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    separable(d, s, |s, d| {
        if s <= 0.5 {
            d - (1.0 - 2.0 * s) * d * (1.0 - d)
        } else {
            let g = if d <= 0.25 {
                ((16.0 * d - 12.0) * d + 4.0) * d
            } else {
                d.sqrt()
            };
            d + (2.0 * s - 1.0) * (g - d)
        }
    })
}

fn blend_difference(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    separable(d, s, |s, d| (d - s).abs())
}

fn blend_exclusion(d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    separable(d, s, |s, d| d + s - 2.0 * d * s)
}

/// Composite a single pixel at full coverage.
pub fn composite_px(op: CompositeOp, d: PremulRgba8, s: PremulRgba8) -> PremulRgba8 {
    match op {
        CompositeOp::Clear => pd_clear(d, s),
        CompositeOp::Source => pd_source(d, s),
        CompositeOp::Over => over_px(d, s),
        CompositeOp::In => pd_in(d, s),
        CompositeOp::Out => pd_out(d, s),
        CompositeOp::Atop => pd_atop(d, s),
        CompositeOp::Dest => pd_dest(d, s),
        CompositeOp::DestOver => pd_dest_over(d, s),
        CompositeOp::DestIn => pd_dest_in(d, s),
        CompositeOp::DestOut => pd_dest_out(d, s),
        CompositeOp::DestAtop => pd_dest_atop(d, s),
        CompositeOp::Xor => pd_xor(d, s),
        CompositeOp::Plus => pd_plus(d, s),
        CompositeOp::Multiply => blend_multiply(d, s),
        CompositeOp::Screen => blend_screen(d, s),
        CompositeOp::Overlay => blend_overlay(d, s),
        CompositeOp::Darken => blend_darken(d, s),
        CompositeOp::Lighten => blend_lighten(d, s),
        CompositeOp::ColorDodge => blend_color_dodge(d, s),
        CompositeOp::ColorBurn => blend_color_burn(d, s),
        CompositeOp::HardLight => blend_hard_light(d, s),
        CompositeOp::SoftLight => blend_soft_light(d, s),
        CompositeOp::Difference => blend_difference(d, s),
        CompositeOp::Exclusion => blend_exclusion(d, s),
    }
}

/// Source-over a span: each source pixel is scaled by its coverage first.
pub(crate) fn over_span(dst: &mut [PremulRgba8], src: &[PremulRgba8], covers: &[u8]) {
    for ((d, &s), &cov) in dst.iter_mut().zip(src).zip(covers) {
        match cov {
            0 => {}
            255 => *d = over_px(*d, s),
            _ => *d = over_px(*d, scale(s, u16::from(cov))),
        }
    }
}

#[inline(always)]
fn span_with<F>(dst: &mut [PremulRgba8], src: &[PremulRgba8], covers: &[u8], kernel: F)
where
    F: Fn(PremulRgba8, PremulRgba8) -> PremulRgba8,
{
    for ((d, &s), &cov) in dst.iter_mut().zip(src).zip(covers) {
        match cov {
            0 => {}
            255 => *d = kernel(*d, s),
            _ => *d = lerp(*d, kernel(*d, s), cov),
        }
    }
}

/// Composite a span with an explicit operator; partial coverage interpolates between the
/// destination and the operator result.
pub(crate) fn blend_span_op(
    op: CompositeOp,
    dst: &mut [PremulRgba8],
    src: &[PremulRgba8],
    covers: &[u8],
) {
    match op {
        CompositeOp::Over => over_span(dst, src, covers),
        CompositeOp::Dest => {}
        _ => span_with(dst, src, covers, |d, s| composite_px(op, d, s)),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
