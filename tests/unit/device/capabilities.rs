use super::*;

#[test]
fn reports_every_supported_feature() {
    let caps = Capabilities::current();
    assert_eq!(caps.patterns.len(), 3);
    assert_eq!(caps.extend_modes, ExtendMode::ALL.to_vec());
    assert_eq!(caps.mask_modes, vec![MaskMode::Alpha, MaskMode::Luminance]);
    assert_eq!(caps.composite_ops.len(), 24);
    assert!(caps.supports_op(CompositeOp::Xor));
    assert!(caps.clipping_paths && caps.groups && caps.glyphs);
}

#[test]
fn serializes_with_snake_case_names() {
    let json = serde_json::to_string(&Capabilities::current()).unwrap();
    assert!(json.contains("\"luminance\""));
    assert!(json.contains("\"linear_gradient\""));
    assert!(json.contains("\"color_dodge\""));
    let back: Capabilities = serde_json::from_str(&json).unwrap();
    assert_eq!(back, Capabilities::current());
}
