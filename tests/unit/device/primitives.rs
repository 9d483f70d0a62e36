use super::*;

use crate::device::opts::DeviceOpts;
use crate::foundation::core::Rgba8;
use crate::render::stroke::{LineType, StrokeStyle};

const RED: Rgba8 = Rgba8::new(255, 0, 0, 255);
const WHITE: [u8; 4] = [255, 255, 255, 255];

fn device(w: u32, h: u32) -> Device {
    Device::new(DeviceOpts::default().with_size(w, h)).unwrap()
}

fn px(dev: &Device, x: u32, y: u32) -> [u8; 4] {
    dev.surface().pixel(x, y).to_array()
}

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
    vec![
        Point::new(x0, y0),
        Point::new(x1, y0),
        Point::new(x1, y1),
        Point::new(x0, y1),
    ]
}

#[test]
fn circle_fills_its_centre() {
    let mut dev = device(20, 20);
    dev.draw_circle(10.0, 10.0, 6.0, &DrawStyle::fill(RED)).unwrap();
    assert_eq!(px(&dev, 10, 10), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 1, 1), WHITE);
    dev.draw_circle(10.0, 10.0, -1.0, &DrawStyle::fill(Rgba8::BLACK))
        .unwrap();
    assert_eq!(px(&dev, 10, 10), [255, 0, 0, 255]);
}

#[test]
fn rect_corners_may_come_in_any_order() {
    let mut dev = device(10, 10);
    dev.draw_rect(8.0, 8.0, 2.0, 2.0, &DrawStyle::fill(RED)).unwrap();
    assert_eq!(px(&dev, 5, 5), [255, 0, 0, 255]);
}

#[test]
fn degenerate_polygons_draw_nothing() {
    let mut dev = device(10, 10);
    let style = DrawStyle::fill(RED).with_stroke(Rgba8::BLACK);
    dev.draw_polygon(&[], &style).unwrap();
    dev.draw_polygon(&[Point::new(5.0, 5.0)], &style).unwrap();
    dev.draw_polyline(&[Point::new(5.0, 5.0)], &style).unwrap();
    assert!(dev.surface().data().iter().all(|&b| b == 255));
}

#[test]
fn polygon_is_closed_and_filled() {
    let mut dev = device(10, 10);
    dev.draw_polygon(&square(1.0, 1.0, 9.0, 9.0), &DrawStyle::fill(RED))
        .unwrap();
    assert_eq!(px(&dev, 5, 5), [255, 0, 0, 255]);
}

#[test]
fn lines_are_never_filled() {
    let mut dev = device(20, 20);
    let style = DrawStyle::fill(RED)
        .with_stroke(Rgba8::BLACK)
        .with_stroke_style(StrokeStyle::default().with_width(4.0));
    dev.draw_polyline(&square(2.0, 2.0, 18.0, 18.0), &style)
        .unwrap();
    assert_eq!(px(&dev, 10, 10), WHITE);
    assert_eq!(px(&dev, 10, 2), [0, 0, 0, 255]);

    dev.draw_line(2.0, 10.0, 18.0, 10.0, &style).unwrap();
    assert_eq!(px(&dev, 10, 10), [0, 0, 0, 255]);
}

#[test]
fn compound_path_honours_the_fill_rule() {
    let outer = square(0.0, 0.0, 20.0, 20.0);
    let inner = square(5.0, 5.0, 15.0, 15.0);
    let polys = vec![outer, inner, vec![Point::new(1.0, 1.0)]];

    let mut dev = device(20, 20);
    dev.draw_path(&polys, true, &DrawStyle::fill(RED)).unwrap();
    assert_eq!(px(&dev, 2, 2), [255, 0, 0, 255]);
    assert_eq!(px(&dev, 10, 10), WHITE);

    let mut dev = device(20, 20);
    dev.draw_path(&polys, false, &DrawStyle::fill(RED)).unwrap();
    assert_eq!(px(&dev, 10, 10), [255, 0, 0, 255]);
}

#[test]
fn blank_line_type_suppresses_the_stroke() {
    let mut dev = device(10, 10);
    let style = DrawStyle::stroke(Rgba8::BLACK, 4.0).with_stroke_style(
        StrokeStyle::default()
            .with_width(4.0)
            .with_line_type(LineType::BLANK),
    );
    dev.draw_line(0.0, 5.0, 10.0, 5.0, &style).unwrap();
    assert!(dev.surface().data().iter().all(|&b| b == 255));
}
