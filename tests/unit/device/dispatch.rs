use super::*;

use crate::device::opts::DeviceOpts;
use crate::paint::gradient::ColorStop;
use crate::paint::pattern::{ExtendMode, PatternDesc};
use crate::render::composite::CompositeOp;
use crate::render::stroke::LineCap;
use crate::resource::mask::MaskMode;

const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
const BLUE: Rgba8 = Rgba8::new(0, 0, 255, 255);
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn device(w: u32, h: u32) -> Device {
    Device::new(DeviceOpts::default().with_size(w, h)).unwrap()
}

fn px(dev: &Device, x: u32, y: u32) -> [u8; 4] {
    dev.surface().pixel(x, y).to_array()
}

fn near(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(&x, y)| x.abs_diff(y) <= 2)
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> BezPath {
    Rect::new(x0, y0, x1, y1).to_path(0.1)
}

#[test]
fn solid_fill_lands_on_the_surface() {
    let mut dev = device(10, 10);
    dev.fill_stroke(&rect(2.0, 2.0, 8.0, 8.0), &DrawStyle::fill(RED))
        .unwrap();
    assert_eq!(px(&dev, 5, 5), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 0, 0), WHITE);
    assert_eq!(px(&dev, 9, 9), WHITE);
}

#[test]
fn invisible_style_draws_nothing() {
    let mut dev = device(10, 10);
    let style = DrawStyle::default().with_stroke_style(StrokeStyle::default().with_width(0.0));
    dev.fill_stroke(&rect(0.0, 0.0, 10.0, 10.0), &style).unwrap();
    assert!(dev.surface().data().iter().all(|&b| b == 255));
}

#[test]
fn clip_recording_emits_no_pixels() {
    let mut dev = device(10, 10);
    dev.create_clip(
        &mut |d: &mut Device| {
            d.fill_stroke(&rect(0.0, 0.0, 10.0, 10.0), &DrawStyle::fill(RED))?;
            d.draw_text(&[rect(1.0, 1.0, 3.0, 3.0)], BLUE)
        },
        FillRule::NonZero,
        None,
    )
    .unwrap();
    assert!(dev.surface().data().iter().all(|&b| b == 255));
}

#[test]
fn active_clip_path_limits_drawing() {
    let mut dev = device(20, 20);
    dev.create_clip(
        &mut |d: &mut Device| d.fill_stroke(&rect(0.0, 0.0, 10.0, 10.0), &DrawStyle::default()),
        FillRule::NonZero,
        None,
    )
    .unwrap();
    dev.fill_stroke(&rect(0.0, 0.0, 20.0, 20.0), &DrawStyle::fill(RED))
        .unwrap();
    assert_eq!(px(&dev, 5, 5), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 15, 5), WHITE);
    assert_eq!(px(&dev, 15, 15), WHITE);
}

#[test]
fn even_odd_clip_leaves_a_hole() {
    let mut dev = device(20, 20);
    dev.create_clip(
        &mut |d: &mut Device| {
            d.fill_stroke(&rect(0.0, 0.0, 20.0, 20.0), &DrawStyle::default())?;
            d.fill_stroke(&rect(5.0, 5.0, 15.0, 15.0), &DrawStyle::default())
        },
        FillRule::EvenOdd,
        None,
    )
    .unwrap();
    dev.fill_stroke(&rect(0.0, 0.0, 20.0, 20.0), &DrawStyle::fill(RED))
        .unwrap();
    assert_eq!(px(&dev, 2, 2), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 10, 10), WHITE);
}

#[test]
fn alpha_mask_scales_coverage() {
    let mut dev = device(10, 10);
    dev.create_mask(
        &mut |d: &mut Device| {
            d.fill_stroke(
                &rect(0.0, 0.0, 10.0, 10.0),
                &DrawStyle::fill(Rgba8::new(255, 0, 0, 128)),
            )
        },
        MaskMode::Alpha,
        None,
    )
    .unwrap();
    dev.fill_stroke(&rect(0.0, 0.0, 10.0, 10.0), &DrawStyle::fill(Rgba8::BLACK))
        .unwrap();
    assert!(near(px(&dev, 5, 5), [127, 127, 127, 255]));
}

#[test]
fn luminance_mask_reads_the_rgb_channels() {
    let mut dev = device(10, 10);
    dev.create_mask(
        &mut |d: &mut Device| d.fill_stroke(&rect(0.0, 0.0, 10.0, 10.0), &DrawStyle::fill(RED)),
        MaskMode::Luminance,
        None,
    )
    .unwrap();
    dev.fill_stroke(&rect(0.0, 0.0, 10.0, 10.0), &DrawStyle::fill(Rgba8::BLACK))
        .unwrap();
    // Coverage 54/255 of black over white.
    assert!(near(px(&dev, 5, 5), [201, 201, 201, 255]));
}

#[test]
fn masked_out_pixels_are_untouched() {
    let mut dev = device(10, 10);
    dev.create_mask(
        &mut |d: &mut Device| d.fill_stroke(&rect(0.0, 0.0, 5.0, 10.0), &DrawStyle::fill(RED)),
        MaskMode::Alpha,
        None,
    )
    .unwrap();
    dev.fill_stroke(&rect(0.0, 0.0, 10.0, 10.0), &DrawStyle::fill(BLUE))
        .unwrap();
    assert_eq!(px(&dev, 2, 5), [0, 0, 255, 255]);
    assert_eq!(px(&dev, 7, 5), WHITE);
}

#[test]
fn gradient_pattern_replaces_the_fill_color() {
    let mut dev = device(20, 4);
    let desc = PatternDesc::Linear {
        x1: 0.0,
        y1: 0.0,
        x2: 20.0,
        y2: 0.0,
        stops: vec![ColorStop::new(0.0, RED), ColorStop::new(1.0, BLUE)],
        extend: ExtendMode::Pad,
    };
    let key = dev.create_pattern(&desc, None, None).unwrap();
    dev.fill_stroke(
        &rect(0.0, 0.0, 20.0, 4.0),
        &DrawStyle::default().with_pattern(key),
    )
    .unwrap();
    let left = px(&dev, 0, 1);
    let right = px(&dev, 19, 1);
    assert!(left[0] > 200 && left[2] < 40, "{left:?}");
    assert!(right[2] > 200 && right[0] < 40, "{right:?}");
}

#[test]
fn unknown_pattern_falls_back_to_the_fill_color() {
    let mut dev = device(4, 4);
    dev.fill_stroke(
        &rect(0.0, 0.0, 4.0, 4.0),
        &DrawStyle::fill(RED).with_pattern(ResourceKey(9)),
    )
    .unwrap();
    assert_eq!(px(&dev, 1, 1), [255, 0, 0, 255]);
}

#[test]
fn tile_pattern_repeats_in_device_space() {
    let mut dev = device(16, 4);
    let desc = PatternDesc::Tile {
        width: 4,
        height: 4,
        x: 8.0,
        y: 0.0,
        extend: ExtendMode::Repeat,
    };
    let key = dev
        .create_pattern(
            &desc,
            Some(&mut |d: &mut Device| {
                assert_eq!(d.state_snapshot().translation, Vec2::new(-8.0, 0.0));
                d.fill_stroke(&rect(8.0, 0.0, 10.0, 4.0), &DrawStyle::fill(RED))
            }),
            None,
        )
        .unwrap();

    let tile = dev.pattern(key).unwrap().tile_buffer().unwrap();
    assert_eq!(tile.pixel(0, 1).to_array(), [255, 0, 0, 255]);
    assert_eq!(tile.pixel(3, 1).to_array(), [0, 0, 0, 0]);

    dev.fill_stroke(
        &rect(0.0, 0.0, 16.0, 4.0),
        &DrawStyle::default().with_pattern(key),
    )
    .unwrap();
    assert_eq!(px(&dev, 8, 1), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 9, 1), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 10, 1), WHITE);
    assert_eq!(px(&dev, 4, 1), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 12, 1), [255, 0, 0, 255]);
}

#[test]
fn group_in_keeps_source_only_inside_the_destination() {
    let mut dev = device(20, 20);
    let key = dev
        .define_group(
            &mut |d: &mut Device| d.fill_stroke(&rect(5.0, 0.0, 15.0, 20.0), &DrawStyle::fill(RED)),
            CompositeOp::In,
            Some(&mut |d: &mut Device| {
                d.fill_stroke(&rect(0.0, 0.0, 10.0, 20.0), &DrawStyle::fill(BLUE))
            }),
            None,
        )
        .unwrap();
    assert_eq!(px(&dev, 7, 5), WHITE);

    dev.use_group(key, Affine::IDENTITY).unwrap();
    assert_eq!(px(&dev, 7, 5), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 2, 5), WHITE);
    assert_eq!(px(&dev, 12, 5), WHITE);
    assert_eq!(px(&dev, 17, 5), WHITE);
}

#[test]
fn group_in_blends_fill_and_stroke_of_one_call_together() {
    let mut dev = device(32, 32);
    let style = DrawStyle::fill(BLUE)
        .with_stroke(Rgba8::new(0, 255, 0, 255))
        .with_stroke_style(StrokeStyle::default().with_width(8.0));
    let key = dev
        .define_group(
            &mut |d: &mut Device| d.fill_stroke(&rect(8.0, 8.0, 24.0, 24.0), &style),
            CompositeOp::In,
            Some(&mut |d: &mut Device| {
                d.fill_stroke(&rect(0.0, 0.0, 32.0, 32.0), &DrawStyle::fill(RED))
            }),
            None,
        )
        .unwrap();

    let dst = dev.group(key).unwrap().destination();
    assert_eq!(dst.pixel(16, 16).to_array(), [0, 0, 255, 255]);
    assert_eq!(dst.pixel(8, 16).to_array(), [0, 255, 0, 255]);
    assert_eq!(dst.pixel(2, 2).a, 0);

    dev.use_group(key, Affine::IDENTITY).unwrap();
    assert_eq!(px(&dev, 16, 16), [0, 0, 255, 255]);
    assert_eq!(px(&dev, 2, 2), WHITE);
}

#[test]
fn group_over_stacks_source_on_destination() {
    let mut dev = device(20, 20);
    let key = dev
        .define_group(
            &mut |d: &mut Device| d.fill_stroke(&rect(5.0, 0.0, 15.0, 20.0), &DrawStyle::fill(RED)),
            CompositeOp::Over,
            Some(&mut |d: &mut Device| {
                d.fill_stroke(&rect(0.0, 0.0, 10.0, 20.0), &DrawStyle::fill(BLUE))
            }),
            None,
        )
        .unwrap();
    dev.use_group(key, Affine::IDENTITY).unwrap();
    assert_eq!(px(&dev, 2, 5), [0, 0, 255, 255]);
    assert_eq!(px(&dev, 7, 5), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 17, 5), WHITE);
}

#[test]
fn translated_group_is_resampled() {
    let mut dev = device(20, 20);
    let key = dev
        .define_group(
            &mut |d: &mut Device| d.fill_stroke(&rect(0.0, 0.0, 4.0, 4.0), &DrawStyle::fill(RED)),
            CompositeOp::Over,
            None,
            None,
        )
        .unwrap();
    dev.use_group(key, Affine::translate((10.0, 10.0))).unwrap();
    assert_eq!(px(&dev, 2, 2), WHITE);
    assert_eq!(px(&dev, 12, 12), [255, 0, 0, 255]);
}

#[test]
fn unknown_group_is_ignored() {
    let mut dev = device(4, 4);
    dev.use_group(ResourceKey(3), Affine::IDENTITY).unwrap();
    assert!(dev.surface().data().iter().all(|&b| b == 255));
}

#[test]
fn text_fills_every_glyph() {
    let mut dev = device(12, 4);
    dev.draw_text(&[rect(0.0, 0.0, 4.0, 4.0), rect(8.0, 0.0, 12.0, 4.0)], RED)
        .unwrap();
    assert_eq!(px(&dev, 1, 1), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 6, 1), WHITE);
    assert_eq!(px(&dev, 10, 1), [255, 0, 0, 255]);
}

#[test]
fn image_is_scaled_into_its_rectangle() {
    let mut dev = device(10, 10);
    let mut data = Vec::new();
    for c in [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255], [0, 0, 0, 255]] {
        data.extend_from_slice(&c);
    }
    let image = RenderBuffer::from_data(2, 2, PixelLayout::Rgba8Premul, data).unwrap();
    dev.draw_image(&image, 0.0, 0.0, 10.0, 10.0, 0.0, false)
        .unwrap();
    assert_eq!(px(&dev, 2, 2), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 7, 2), [0, 255, 0, 255]);
    assert_eq!(px(&dev, 2, 7), [0, 0, 255, 255]);
    assert_eq!(px(&dev, 7, 7), [0, 0, 0, 255]);
}

#[test]
fn stroke_width_is_scaled_to_device_pixels() {
    let mut dev = device(20, 20);
    let style = DrawStyle::stroke(Rgba8::BLACK, 8.0)
        .with_stroke_style(StrokeStyle::default().with_width(8.0).with_cap(LineCap::Butt));
    let mut path = BezPath::new();
    path.move_to((2.0, 10.0));
    path.line_to((18.0, 10.0));
    dev.fill_stroke(&path, &style).unwrap();
    // 8 units at 72 ppi is 6 pixels wide: rows 7..13.
    assert_eq!(px(&dev, 10, 8), [0, 0, 0, 255]);
    assert_eq!(px(&dev, 10, 12), [0, 0, 0, 255]);
    assert_eq!(px(&dev, 10, 14), WHITE);
    assert_eq!(px(&dev, 10, 5), WHITE);
}

#[test]
fn drawing_into_a_translated_tile_respects_its_bounds() {
    let mut dev = device(8, 8);
    let key = dev
        .create_pattern(
            &PatternDesc::Tile {
                width: 2,
                height: 2,
                x: 4.0,
                y: 4.0,
                extend: ExtendMode::None,
            },
            Some(&mut |d: &mut Device| {
                d.fill_stroke(&rect(0.0, 0.0, 8.0, 8.0), &DrawStyle::fill(BLUE))
            }),
            None,
        )
        .unwrap();
    let tile = dev.pattern(key).unwrap().tile_buffer().unwrap();
    assert_eq!((tile.width(), tile.height()), (2, 2));
    assert_eq!(tile.pixel(1, 1).to_array(), [0, 0, 255, 255]);
    assert!(dev.surface().data().iter().all(|&b| b == 255));
}
