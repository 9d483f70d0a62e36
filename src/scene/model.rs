use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::device::DrawStyle;
use crate::device::opts::DeviceOpts;
use crate::foundation::core::{FillRule, Point, ResourceKey, Rgba8};
use crate::foundation::error::{DeviceError, DeviceResult};
use crate::paint::gradient::ColorStop;
use crate::paint::pattern::{ExtendMode, PatternDesc};
use crate::render::buffer::PixelLayout;
use crate::render::composite::CompositeOp;
use crate::render::stroke::{LineCap, LineJoin, LineType, StrokeStyle};
use crate::resource::mask::MaskMode;
use crate::scene::color::ColorDef;

/// A page description: canvas, device settings and a command list.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneDoc {
    pub canvas: CanvasDef,
    #[serde(default)]
    pub background: Option<ColorDef>,
    #[serde(default)]
    pub layout: PixelLayout,
    #[serde(default)]
    pub resolution: Option<f64>,
    #[serde(default)]
    pub max_offscreen_bytes: Option<usize>,
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CanvasDef {
    pub width: u32,
    pub height: u32,
}

impl SceneDoc {
    pub fn from_reader<R: std::io::Read>(r: R) -> DeviceResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| DeviceError::validation(format!("parse scene JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> DeviceResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            DeviceError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Device options for this document, with environment overrides applied.
    pub fn device_opts(&self) -> DeviceOpts {
        let mut opts = DeviceOpts::default()
            .with_size(self.canvas.width, self.canvas.height)
            .with_layout(self.layout);
        if let Some(bg) = self.background {
            opts = opts.with_background(bg.to_rgba8());
        }
        if let Some(res) = self.resolution {
            opts = opts.with_resolution(res);
        }
        if let Some(bytes) = self.max_offscreen_bytes {
            opts = opts.with_max_offscreen_bytes(bytes);
        }
        opts.with_env_overrides()
    }
}

/// One scene command. Recording commands carry their sub-scene inline.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Rect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        #[serde(default)]
        style: StyleDef,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        #[serde(default)]
        style: StyleDef,
    },
    Polygon {
        points: Vec<[f64; 2]>,
        #[serde(default)]
        style: StyleDef,
    },
    Polyline {
        points: Vec<[f64; 2]>,
        #[serde(default)]
        style: StyleDef,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        #[serde(default)]
        style: StyleDef,
    },
    Path {
        polygons: Vec<Vec<[f64; 2]>>,
        #[serde(default)]
        even_odd: bool,
        #[serde(default)]
        style: StyleDef,
    },
    /// Glyph outlines given as closed polygons.
    Text {
        glyphs: Vec<Vec<[f64; 2]>>,
        color: ColorDef,
    },
    /// Row-major straight-alpha pixels.
    Image {
        width: u32,
        height: u32,
        pixels: Vec<ColorDef>,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        #[serde(default)]
        rotation: f64,
        #[serde(default)]
        interpolate: bool,
    },
    ClipRect {
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },
    Clip {
        #[serde(default)]
        key: Option<ResourceKey>,
        #[serde(default)]
        rule: FillRule,
        scene: Vec<Command>,
    },
    ActivateClip {
        key: ResourceKey,
    },
    ReleaseClip {
        #[serde(default)]
        key: Option<ResourceKey>,
    },
    Mask {
        #[serde(default)]
        key: Option<ResourceKey>,
        #[serde(default)]
        mode: MaskMode,
        scene: Vec<Command>,
    },
    ActivateMask {
        key: ResourceKey,
    },
    ReleaseMask {
        #[serde(default)]
        key: Option<ResourceKey>,
    },
    Pattern {
        #[serde(default)]
        key: Option<ResourceKey>,
        pattern: PatternDef,
        #[serde(default)]
        scene: Option<Vec<Command>>,
    },
    ReleasePattern {
        #[serde(default)]
        key: Option<ResourceKey>,
    },
    Group {
        #[serde(default)]
        key: Option<ResourceKey>,
        #[serde(default)]
        operator: CompositeOp,
        source: Vec<Command>,
        #[serde(default)]
        destination: Option<Vec<Command>>,
    },
    UseGroup {
        key: ResourceKey,
        /// Affine coefficients `[a, b, c, d, e, f]`.
        #[serde(default)]
        transform: Option<[f64; 6]>,
    },
    ReleaseGroup {
        #[serde(default)]
        key: Option<ResourceKey>,
    },
    NewPage {
        #[serde(default)]
        background: Option<ColorDef>,
    },
}

/// Graphics parameters of a shape command.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleDef {
    pub fill: Option<ColorDef>,
    pub stroke: Option<ColorDef>,
    pub pattern: Option<ResourceKey>,
    /// Line width in 1/96 inch.
    pub lwd: Option<f64>,
    pub line_type: LineType,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: Option<f64>,
    pub fill_rule: FillRule,
}

impl StyleDef {
    pub fn to_draw_style(&self) -> DrawStyle {
        let defaults = StrokeStyle::default();
        DrawStyle {
            fill: self.fill.map_or(Rgba8::TRANSPARENT, ColorDef::to_rgba8),
            pattern: self.pattern.and_then(ResourceKey::valid),
            stroke: self.stroke.map_or(Rgba8::TRANSPARENT, ColorDef::to_rgba8),
            stroke_style: StrokeStyle {
                width: self.lwd.unwrap_or(defaults.width),
                cap: self.cap,
                join: self.join,
                miter_limit: self.miter_limit.unwrap_or(defaults.miter_limit),
                line_type: self.line_type,
            },
            fill_rule: self.fill_rule,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StopDef {
    pub offset: f32,
    pub color: ColorDef,
}

/// Pattern description with scene-style colors.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternDef {
    Linear {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        #[serde(default)]
        stops: Vec<StopDef>,
        #[serde(default)]
        extend: ExtendMode,
    },
    Radial {
        cx1: f64,
        cy1: f64,
        r1: f64,
        cx2: f64,
        cy2: f64,
        r2: f64,
        #[serde(default)]
        stops: Vec<StopDef>,
        #[serde(default)]
        extend: ExtendMode,
    },
    Tile {
        width: u32,
        height: u32,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        extend: ExtendMode,
    },
}

fn stops(defs: &[StopDef]) -> Vec<ColorStop> {
    defs.iter()
        .map(|s| ColorStop::new(s.offset, s.color.to_rgba8()))
        .collect()
}

impl PatternDef {
    pub fn to_desc(&self) -> PatternDesc {
        match self {
            Self::Linear {
                x1,
                y1,
                x2,
                y2,
                stops: s,
                extend,
            } => PatternDesc::Linear {
                x1: *x1,
                y1: *y1,
                x2: *x2,
                y2: *y2,
                stops: stops(s),
                extend: *extend,
            },
            Self::Radial {
                cx1,
                cy1,
                r1,
                cx2,
                cy2,
                r2,
                stops: s,
                extend,
            } => PatternDesc::Radial {
                cx1: *cx1,
                cy1: *cy1,
                r1: *r1,
                cx2: *cx2,
                cy2: *cy2,
                r2: *r2,
                stops: stops(s),
                extend: *extend,
            },
            Self::Tile {
                width,
                height,
                x,
                y,
                extend,
            } => PatternDesc::Tile {
                width: *width,
                height: *height,
                x: *x,
                y: *y,
                extend: *extend,
            },
        }
    }
}

pub(crate) fn points(raw: &[[f64; 2]]) -> Vec<Point> {
    raw.iter().map(|&[x, y]| Point::new(x, y)).collect()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
