pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

pub(crate) fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

/// Integer luma weights (sum 256) applied to the stored RGB channels.
pub(crate) fn luminance_u8(r: u8, g: u8, b: u8) -> u8 {
    let r = u32::from(r);
    let g = u32::from(g);
    let b = u32::from(b);
    ((r * 54 + g * 183 + b * 19 + 128) >> 8).min(255) as u8
}

pub(crate) fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
