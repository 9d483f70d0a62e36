use crate::foundation::core::PremulRgba8;
use crate::render::buffer::RenderBuffer;

/// How samples outside the buffer are resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wrap {
    /// Repeat the edge pixel.
    Clamp,
    /// Periodic.
    Repeat,
    /// Mirrored period.
    Reflect,
    /// Transparent outside the buffer.
    Transparent,
}

fn wrap_index(i: i64, n: u32, wrap: Wrap) -> Option<u32> {
    let n = i64::from(n);
    if n == 0 {
        return None;
    }
    let v = match wrap {
        Wrap::Clamp => i.clamp(0, n - 1),
        Wrap::Repeat => i.rem_euclid(n),
        Wrap::Reflect => {
            let m = i.rem_euclid(2 * n);
            if m >= n { 2 * n - 1 - m } else { m }
        }
        Wrap::Transparent => {
            if i < 0 || i >= n {
                return None;
            }
            i
        }
    };
    Some(v as u32)
}

fn fetch(buf: &RenderBuffer, x: i64, y: i64, wrap: Wrap) -> PremulRgba8 {
    match (
        wrap_index(x, buf.width(), wrap),
        wrap_index(y, buf.height(), wrap),
    ) {
        (Some(x), Some(y)) => buf.pixel(x, y),
        _ => PremulRgba8::TRANSPARENT,
    }
}

/// Nearest-neighbour sample at continuous buffer coordinates (pixel `i` spans `[i, i+1)`).
pub fn sample_nearest(buf: &RenderBuffer, x: f64, y: f64, wrap: Wrap) -> PremulRgba8 {
    if !(x.is_finite() && y.is_finite()) {
        return PremulRgba8::TRANSPARENT;
    }
    fetch(buf, x.floor() as i64, y.floor() as i64, wrap)
}

/// Bilinear sample at continuous buffer coordinates, filtering between pixel centres.
pub fn sample_bilinear(buf: &RenderBuffer, x: f64, y: f64, wrap: Wrap) -> PremulRgba8 {
    if !(x.is_finite() && y.is_finite()) {
        return PremulRgba8::TRANSPARENT;
    }
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = (fx - x0) as f32;
    let ty = (fy - y0) as f32;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let p00 = fetch(buf, x0, y0, wrap);
    let p10 = fetch(buf, x0 + 1, y0, wrap);
    let p01 = fetch(buf, x0, y0 + 1, wrap);
    let p11 = fetch(buf, x0 + 1, y0 + 1, wrap);

    let w00 = (1.0 - tx) * (1.0 - ty);
    let w10 = tx * (1.0 - ty);
    let w01 = (1.0 - tx) * ty;
    let w11 = tx * ty;
    let mix = |a: u8, b: u8, c: u8, d: u8| -> u8 {
        let v = f32::from(a) * w00 + f32::from(b) * w10 + f32::from(c) * w01 + f32::from(d) * w11;
        v.round().clamp(0.0, 255.0) as u8
    };

    PremulRgba8 {
        r: mix(p00.r, p10.r, p01.r, p11.r),
        g: mix(p00.g, p10.g, p01.g, p11.g),
        b: mix(p00.b, p10.b, p01.b, p11.b),
        a: mix(p00.a, p10.a, p01.a, p11.a),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/sample.rs"]
mod tests;
