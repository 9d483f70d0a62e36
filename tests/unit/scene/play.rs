use super::*;

use crate::resource::cache::ResourceKind;

fn doc(json: &str) -> SceneDoc {
    SceneDoc::from_reader(json.as_bytes()).unwrap()
}

fn device_for(doc: &SceneDoc) -> Device {
    Device::new(doc.device_opts()).unwrap()
}

#[test]
fn explicit_keys_are_recorded_once_and_reused() {
    let d = doc(r##"{
      "canvas": { "width": 10, "height": 10 },
      "commands": [
        { "op": "mask", "key": 2, "scene": [
          { "op": "rect", "x0": 0, "y0": 0, "x1": 5, "y1": 10, "style": { "fill": "#000000" } }
        ] },
        { "op": "activate_mask", "key": -1 },
        { "op": "mask", "key": 2, "scene": [
          { "op": "rect", "x0": 0, "y0": 0, "x1": 10, "y1": 10, "style": { "fill": "#000000" } }
        ] },
        { "op": "rect", "x0": 0, "y0": 0, "x1": 10, "y1": 10, "style": { "fill": "#0000ff" } }
      ]
    }"##);
    let mut dev = device_for(&d);
    play(&d, &mut dev).unwrap();

    assert_eq!(dev.resource_count(ResourceKind::Mask), 1);
    assert_eq!(dev.state_snapshot().mask, Some(crate::ResourceKey(2)));
    assert_eq!(dev.surface().pixel(2, 2).to_array(), [0, 0, 255, 255]);
    assert_eq!(dev.surface().pixel(7, 2).to_array(), [255, 255, 255, 255]);
}

#[test]
fn group_with_destination_plays_both_sub_scenes() {
    let d = doc(r##"{
      "canvas": { "width": 20, "height": 10 },
      "commands": [
        { "op": "group", "key": 0, "operator": "in",
          "destination": [
            { "op": "rect", "x0": 0, "y0": 0, "x1": 10, "y1": 10, "style": { "fill": "#0000ff" } }
          ],
          "source": [
            { "op": "rect", "x0": 5, "y0": 0, "x1": 15, "y1": 10, "style": { "fill": "#ff0000" } }
          ] },
        { "op": "use_group", "key": 0 }
      ]
    }"##);
    let frame = render_scene(&d).unwrap();
    assert_eq!(frame.pixel(7, 5), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(2, 5), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(12, 5), Some([255, 255, 255, 255]));
}

#[test]
fn tile_pattern_plays_its_scene() {
    let d = doc(r##"{
      "canvas": { "width": 8, "height": 4 },
      "commands": [
        { "op": "pattern", "key": 1,
          "pattern": { "type": "tile", "width": 2, "height": 2, "extend": "repeat" },
          "scene": [
            { "op": "rect", "x0": 0, "y0": 0, "x1": 1, "y1": 2, "style": { "fill": "#00ff00" } }
          ] },
        { "op": "rect", "x0": 0, "y0": 0, "x1": 8, "y1": 4, "style": { "pattern": 1 } }
      ]
    }"##);
    let frame = render_scene(&d).unwrap();
    assert_eq!(frame.pixel(0, 0), Some([0, 255, 0, 255]));
    assert_eq!(frame.pixel(1, 0), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(6, 3), Some([0, 255, 0, 255]));
}

#[test]
fn image_pixel_count_is_checked() {
    let d = doc(r##"{
      "canvas": { "width": 4, "height": 4 },
      "commands": [
        { "op": "image", "width": 2, "height": 2, "pixels": ["#ff0000"],
          "x": 0, "y": 0, "w": 4, "h": 4 }
      ]
    }"##);
    let err = render_scene(&d).unwrap_err();
    assert!(matches!(err, DeviceError::Validation(_)));
}

#[test]
fn new_page_restarts_the_surface() {
    let d = doc(r##"{
      "canvas": { "width": 4, "height": 4 },
      "commands": [
        { "op": "rect", "x0": 0, "y0": 0, "x1": 4, "y1": 4, "style": { "fill": "#ff0000" } },
        { "op": "new_page", "background": "#00ff00" },
        { "op": "clip_rect", "x0": 0, "y0": 0, "x1": 2, "y1": 4 },
        { "op": "text", "color": "#0000ff",
          "glyphs": [ [[0, 0], [4, 0], [4, 4], [0, 4]] ] }
      ]
    }"##);
    let mut dev = device_for(&d);
    play(&d, &mut dev).unwrap();
    assert_eq!(dev.page_number(), 1);
    assert_eq!(dev.surface().pixel(1, 1).to_array(), [0, 0, 255, 255]);
    assert_eq!(dev.surface().pixel(3, 1).to_array(), [0, 255, 0, 255]);
}

#[test]
fn failing_sub_scene_is_reported_as_a_recording_error() {
    let d = doc(r##"{
      "canvas": { "width": 4, "height": 4 },
      "commands": [
        { "op": "clip", "scene": [
          { "op": "image", "width": 1, "height": 1, "pixels": [],
            "x": 0, "y": 0, "w": 1, "h": 1 }
        ] }
      ]
    }"##);
    let mut dev = device_for(&d);
    let err = play(&d, &mut dev).unwrap_err();
    assert!(matches!(err, DeviceError::Recording(_)));
    assert_eq!(dev.resource_count(ResourceKind::Clip), 0);
    assert!(!dev.is_recording_clip());
}
