use super::*;

const DOC: &str = r##"{
  "canvas": { "width": 32, "height": 16 },
  "background": "#000000",
  "resolution": 96,
  "commands": [
    { "op": "rect", "x0": 0, "y0": 0, "x1": 4, "y1": 4,
      "style": { "fill": "#ff0000", "stroke": [0, 0, 1], "lwd": 2, "cap": "butt" } },
    { "op": "mask", "mode": "luminance", "scene": [
      { "op": "circle", "cx": 8, "cy": 8, "r": 4, "style": { "fill": "#ffffff" } }
    ] },
    { "op": "pattern", "key": 7,
      "pattern": { "type": "linear", "x1": 0, "y1": 0, "x2": 10, "y2": 0,
                   "stops": [ { "offset": 0, "color": "#ff0000" },
                              { "offset": 1, "color": "#0000ff" } ],
                   "extend": "reflect" } },
    { "op": "group", "operator": "xor", "source": [], "note": "ignored" }
  ]
}"##;

#[test]
fn unknown_command_fields_are_tolerated_but_unknown_doc_fields_are_not() {
    let doc = SceneDoc::from_reader(DOC.as_bytes()).unwrap();
    assert_eq!(doc.commands.len(), 4);

    let extra = r#"{"canvas":{"width":1,"height":1},"commands":[],"x":1}"#;
    let err = SceneDoc::from_reader(extra.as_bytes()).unwrap_err();
    assert!(matches!(err, DeviceError::Validation(_)));
    assert!(err.to_string().contains("parse scene JSON"));
}

#[test]
fn device_options_come_from_the_document() {
    let doc = SceneDoc::from_reader(DOC.as_bytes()).unwrap();
    let opts = doc.device_opts();
    assert_eq!((opts.width, opts.height), (32, 16));
    assert_eq!(opts.background, Rgba8::BLACK);
    assert_eq!(opts.resolution, 96.0);
    assert_eq!(opts.layout, PixelLayout::Rgba8Premul);
}

#[test]
fn style_defaults_to_an_invisible_draw() {
    let style = StyleDef::default().to_draw_style();
    assert!(!style.fill.is_visible());
    assert!(!style.stroke.is_visible());
    assert_eq!(style.stroke_style, StrokeStyle::default());
}

#[test]
fn style_fields_map_onto_the_draw_style() {
    let doc = SceneDoc::from_reader(DOC.as_bytes()).unwrap();
    let Command::Rect { style, .. } = &doc.commands[0] else {
        panic!("expected a rect");
    };
    let style = style.to_draw_style();
    assert_eq!(style.fill, Rgba8::new(255, 0, 0, 255));
    assert_eq!(style.stroke, Rgba8::new(0, 0, 255, 255));
    assert_eq!(style.stroke_style.width, 2.0);
    assert_eq!(style.stroke_style.cap, LineCap::Butt);
}

#[test]
fn pattern_definitions_convert_colors() {
    let doc = SceneDoc::from_reader(DOC.as_bytes()).unwrap();
    let Command::Pattern { key, pattern, scene } = &doc.commands[2] else {
        panic!("expected a pattern");
    };
    assert_eq!(*key, Some(ResourceKey(7)));
    assert!(scene.is_none());
    let PatternDesc::Linear { stops, extend, .. } = pattern.to_desc() else {
        panic!("expected a linear gradient");
    };
    assert_eq!(extend, ExtendMode::Reflect);
    assert_eq!(stops[1].color, Rgba8::new(0, 0, 255, 255));
}

#[test]
fn group_operator_is_not_the_command_tag() {
    let doc = SceneDoc::from_reader(DOC.as_bytes()).unwrap();
    let Command::Group { operator, .. } = &doc.commands[3] else {
        panic!("expected a group");
    };
    assert_eq!(*operator, CompositeOp::Xor);
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = SceneDoc::from_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, DeviceError::Validation(_)));
}

#[test]
fn points_convert_pairs() {
    assert_eq!(
        points(&[[1.0, 2.0], [3.0, 4.0]]),
        vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]
    );
}
