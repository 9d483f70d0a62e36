use super::*;

fn parse(json: &str) -> Result<ColorDef, serde_json::Error> {
    serde_json::from_str(json)
}

#[test]
fn hex_forms() {
    assert_eq!(
        parse("\"#ff0000\"").unwrap().to_rgba8(),
        Rgba8::new(255, 0, 0, 255)
    );
    assert_eq!(
        parse("\"00FF0080\"").unwrap().to_rgba8(),
        Rgba8::new(0, 255, 0, 128)
    );
    assert!(parse("\"#abc\"").is_err());
    assert!(parse("\"#zz0000\"").is_err());
}

#[test]
fn object_and_array_forms() {
    assert_eq!(
        parse(r#"{"r": 1, "g": 0.5, "b": 0}"#).unwrap().to_rgba8(),
        Rgba8::new(255, 128, 0, 255)
    );
    assert_eq!(
        parse("[0, 0, 1, 0.5]").unwrap().to_rgba8(),
        Rgba8::new(0, 0, 255, 128)
    );
    assert!(parse("[0, 0]").is_err());
}

#[test]
fn channels_are_clamped() {
    assert_eq!(
        ColorDef::rgba(2.0, -1.0, 0.0, 1.0).to_rgba8(),
        Rgba8::new(255, 0, 0, 255)
    );
}
