use kurbo::{Circle, Shape};

use crate::device::{Device, DrawStyle};
use crate::foundation::core::{BezPath, FillRule, Point, Rect};
use crate::foundation::error::DeviceResult;

fn polyline_path(points: &[Point], close: bool) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(&first) = iter.next() {
        path.move_to(first);
        for &p in iter {
            path.line_to(p);
        }
        if close {
            path.close_path();
        }
    }
    path
}

impl Device {
    pub fn draw_circle(&mut self, cx: f64, cy: f64, r: f64, style: &DrawStyle) -> DeviceResult<()> {
        if !(r.is_finite() && r > 0.0) {
            return Ok(());
        }
        self.fill_stroke(&Circle::new((cx, cy), r).to_path(0.1), style)
    }

    pub fn draw_rect(
        &mut self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        style: &DrawStyle,
    ) -> DeviceResult<()> {
        let rect = Rect::new(x0, y0, x1, y1).abs();
        self.fill_stroke(&rect.to_path(0.1), style)
    }

    /// Closed polygon. Fewer than two points draw nothing.
    pub fn draw_polygon(&mut self, points: &[Point], style: &DrawStyle) -> DeviceResult<()> {
        if points.len() < 2 {
            return Ok(());
        }
        self.fill_stroke(&polyline_path(points, true), style)
    }

    /// A single segment, stroked only.
    pub fn draw_line(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: &DrawStyle,
    ) -> DeviceResult<()> {
        let path = polyline_path(&[Point::new(x1, y1), Point::new(x2, y2)], false);
        self.fill_stroke(&path, &style.stroke_only())
    }

    /// Open polyline, stroked only.
    pub fn draw_polyline(&mut self, points: &[Point], style: &DrawStyle) -> DeviceResult<()> {
        if points.len() < 2 {
            return Ok(());
        }
        self.fill_stroke(&polyline_path(points, false), &style.stroke_only())
    }

    /// Compound path of closed sub-polygons filled with the even-odd or nonzero rule.
    /// Sub-polygons with fewer than two points are skipped.
    pub fn draw_path(
        &mut self,
        polygons: &[Vec<Point>],
        even_odd: bool,
        style: &DrawStyle,
    ) -> DeviceResult<()> {
        let mut path = BezPath::new();
        for poly in polygons.iter().filter(|p| p.len() >= 2) {
            for el in polyline_path(poly, true).elements() {
                path.push(*el);
            }
        }
        if path.elements().is_empty() {
            return Ok(());
        }
        let rule = if even_odd {
            FillRule::EvenOdd
        } else {
            FillRule::NonZero
        };
        self.fill_stroke(&path, &style.clone().with_fill_rule(rule))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/device/primitives.rs"]
mod tests;
