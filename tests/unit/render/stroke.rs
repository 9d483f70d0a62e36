use super::*;

#[test]
fn dash_nibbles_scale_by_width() {
    assert_eq!(LineType(0x44).dashes(2.0), vec![8.0, 8.0]);
    assert_eq!(LineType(0x3313).dashes(1.0), vec![3.0, 1.0, 3.0, 3.0]);
    assert!(LineType::SOLID.dashes(3.0).is_empty());
    assert!(LineType::BLANK.dashes(3.0).is_empty());
}

#[test]
fn dash_reading_stops_at_zero_dash() {
    assert_eq!(LineType(0x0026).dashes(1.0), vec![6.0, 2.0]);
}

#[test]
fn invisible_strokes_produce_empty_outline() {
    let mut p = BezPath::new();
    p.move_to((0.0, 0.0));
    p.line_to((10.0, 0.0));

    let blank = StrokeStyle::default().with_line_type(LineType::BLANK);
    assert!(!blank.is_visible());
    assert!(stroke_outline(&p, &blank).elements().is_empty());
    let thin = StrokeStyle::default().with_width(0.0);
    assert!(stroke_outline(&p, &thin).elements().is_empty());
}

#[test]
fn solid_stroke_outline_spans_width() {
    use kurbo::Shape;

    let mut p = BezPath::new();
    p.move_to((0.0, 5.0));
    p.line_to((10.0, 5.0));
    let style = StrokeStyle::default()
        .with_width(4.0)
        .with_cap(LineCap::Butt);
    let bb = stroke_outline(&p, &style).bounding_box();
    assert!((bb.y0 - 3.0).abs() < 1e-6);
    assert!((bb.y1 - 7.0).abs() < 1e-6);
    assert!((bb.x0 - 0.0).abs() < 1e-6);
    assert!((bb.x1 - 10.0).abs() < 1e-6);
}

#[test]
fn style_deserializes_with_defaults() {
    let s: StrokeStyle = serde_json::from_str(r#"{"width": 3, "line_type": 68}"#).unwrap();
    assert_eq!(s.width, 3.0);
    assert_eq!(s.line_type, LineType(0x44));
    assert_eq!(s.cap, LineCap::Round);
}
