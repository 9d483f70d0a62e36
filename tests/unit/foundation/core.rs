use super::*;

#[test]
fn premultiply_roundtrips_opaque() {
    let c = Rgba8::new(10, 20, 30, 255);
    assert_eq!(c.premultiply().to_straight(), c);
}

#[test]
fn premultiply_half_alpha() {
    let p = Rgba8::new(255, 0, 0, 128).premultiply();
    assert_eq!(p.to_array(), [128, 0, 0, 128]);
    assert_eq!(p.to_straight(), Rgba8::new(255, 0, 0, 128));
}

#[test]
fn transparent_premul_unpremultiplies_to_zero() {
    assert_eq!(
        PremulRgba8::from_array([7, 7, 7, 0]).to_straight(),
        Rgba8::TRANSPARENT
    );
}

#[test]
fn visibility_is_alpha_nonzero() {
    assert!(!Rgba8::new(255, 255, 255, 0).is_visible());
    assert!(Rgba8::new(0, 0, 0, 1).is_visible());
}

#[test]
fn resource_key_sentinel() {
    assert_eq!(ResourceKey::default(), ResourceKey::NONE);
    assert!(!ResourceKey::NONE.is_some());
    assert!(!ResourceKey(-7).is_some());
    assert_eq!(ResourceKey(3).valid(), Some(ResourceKey(3)));
    assert_eq!(ResourceKey(-2).valid(), None);
}

#[test]
fn resource_key_serializes_as_integer() {
    let s = serde_json::to_string(&ResourceKey(4)).unwrap();
    assert_eq!(s, "4");
    let k: ResourceKey = serde_json::from_str("-1").unwrap();
    assert_eq!(k, ResourceKey::NONE);
}

#[test]
fn fill_rule_serde_names() {
    let r: FillRule = serde_json::from_str("\"even_odd\"").unwrap();
    assert_eq!(r, FillRule::EvenOdd);
}
