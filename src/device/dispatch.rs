use kurbo::Shape;

use crate::device::Device;
use crate::device::state::{Recording, RenderState, Target};
use crate::foundation::core::{
    Affine, BezPath, FillRule, Point, PremulRgba8, Rect, ResourceKey, Rgba8, Vec2,
};
use crate::foundation::error::{DeviceError, DeviceResult};
use crate::paint::pattern::Pattern;
use crate::render::buffer::{PixelLayout, RenderBuffer, Renderer};
use crate::render::raster::Coverage;
use crate::render::sample::{Wrap, sample_bilinear, sample_nearest};
use crate::render::stroke::{StrokeStyle, stroke_outline};

/// Fill and stroke parameters of a single draw call, in host units.
///
/// Stroke widths are in 1/96 inch and scaled to device pixels by the device.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawStyle {
    pub fill: Rgba8,
    /// Pattern used instead of `fill` when it resolves to a live pattern.
    pub pattern: Option<ResourceKey>,
    pub stroke: Rgba8,
    pub stroke_style: StrokeStyle,
    pub fill_rule: FillRule,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            fill: Rgba8::TRANSPARENT,
            pattern: None,
            stroke: Rgba8::TRANSPARENT,
            stroke_style: StrokeStyle::default(),
            fill_rule: FillRule::NonZero,
        }
    }
}

impl DrawStyle {
    /// Fill only.
    pub fn fill(color: Rgba8) -> Self {
        Self {
            fill: color,
            ..Self::default()
        }
    }

    /// Stroke only.
    pub fn stroke(color: Rgba8, width: f64) -> Self {
        Self {
            stroke: color,
            stroke_style: StrokeStyle::default().with_width(width),
            ..Self::default()
        }
    }

    pub fn with_fill(mut self, color: Rgba8) -> Self {
        self.fill = color;
        self
    }

    pub fn with_stroke(mut self, color: Rgba8) -> Self {
        self.stroke = color;
        self
    }

    pub fn with_stroke_style(mut self, style: StrokeStyle) -> Self {
        self.stroke_style = style;
        self
    }

    pub fn with_pattern(mut self, key: ResourceKey) -> Self {
        self.pattern = key.valid();
        self
    }

    pub fn with_fill_rule(mut self, rule: FillRule) -> Self {
        self.fill_rule = rule;
        self
    }

    /// The same style with the fill removed.
    pub(crate) fn stroke_only(&self) -> Self {
        Self {
            fill: Rgba8::TRANSPARENT,
            pattern: None,
            ..self.clone()
        }
    }
}

/// Paint source requested by a draw call, resolved against the caches per draw.
pub(crate) enum Paint<'a> {
    Solid(PremulRgba8),
    Pattern(ResourceKey),
    Group {
        key: ResourceKey,
        inverse: Affine,
        smooth: bool,
    },
    Image {
        image: &'a RenderBuffer,
        inverse: Affine,
        smooth: bool,
    },
}

enum Shader<'a> {
    Solid(PremulRgba8),
    Pattern(&'a Pattern),
    Sampled {
        buffer: &'a RenderBuffer,
        inverse: Affine,
        smooth: bool,
        wrap: Wrap,
    },
}

impl Shader<'_> {
    fn fill_span(
        &self,
        y: u32,
        x0: u32,
        len: usize,
        translation: Vec2,
        out: &mut Vec<PremulRgba8>,
    ) {
        match self {
            Self::Solid(c) => {
                out.clear();
                out.resize(len, *c);
            }
            Self::Pattern(p) => p.fill_span(y, x0, len, translation, out),
            Self::Sampled {
                buffer,
                inverse,
                smooth,
                wrap,
            } => {
                out.clear();
                let py = f64::from(y) + 0.5;
                out.extend((0..len).map(|i| {
                    let p = *inverse * Point::new(f64::from(x0) + i as f64 + 0.5, py);
                    if *smooth {
                        sample_bilinear(buffer, p.x, p.y, *wrap)
                    } else {
                        sample_nearest(buffer, p.x, p.y, *wrap)
                    }
                }));
            }
        }
    }
}

fn translated(path: &BezPath, t: Vec2) -> BezPath {
    let mut out = path.clone();
    if t != Vec2::ZERO {
        out.apply_affine(Affine::translate(t));
    }
    out
}

impl Device {
    /// Fill and/or stroke `path`, routed to the current target.
    pub fn fill_stroke(&mut self, path: &BezPath, style: &DrawStyle) -> DeviceResult<()> {
        let state = *self.top();
        let path = translated(path, state.translation);

        if let Target::Clip(index) = state.target {
            self.append_clip_geometry(index, &path);
            return Ok(());
        }

        let pattern = style.pattern.filter(|&key| {
            let live = self.patterns.contains(key);
            if !live {
                tracing::warn!(%key, "unknown pattern; using the solid fill");
            }
            live
        });
        let stroke_style = StrokeStyle {
            width: style.stroke_style.width * self.lwd_scale,
            ..style.stroke_style.clone()
        };
        let draw_fill = style.fill.is_visible() || pattern.is_some();
        let draw_stroke = style.stroke.is_visible() && stroke_style.is_visible();

        if draw_fill {
            let paint = match pattern {
                Some(key) => Paint::Pattern(key),
                None => Paint::Solid(style.fill.premultiply()),
            };
            self.paint_path(&path, style.fill_rule, paint)?;
        }
        if draw_stroke {
            let outline = stroke_outline(&path, &stroke_style);
            self.paint_path(
                &outline,
                FillRule::NonZero,
                Paint::Solid(style.stroke.premultiply()),
            )?;
        }
        self.end_draw();
        Ok(())
    }

    /// Fill positioned glyph outlines with `color` (nonzero rule).
    pub fn draw_text(&mut self, glyphs: &[BezPath], color: Rgba8) -> DeviceResult<()> {
        let mut path = BezPath::new();
        for glyph in glyphs {
            for el in glyph.elements() {
                path.push(*el);
            }
        }
        if path.elements().is_empty() {
            return Ok(());
        }
        self.fill_stroke(&path, &DrawStyle::fill(color))
    }

    /// Draw `image` into the `w x h` rectangle whose top-left corner is `(x, y)`, rotated
    /// counter-clockwise by `rotation_deg` around that corner.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image(
        &mut self,
        image: &RenderBuffer,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        rotation_deg: f64,
        interpolate: bool,
    ) -> DeviceResult<()> {
        let state = *self.top();
        if let Target::Clip(_) = state.target {
            tracing::debug!("image ignored while recording a clip");
            return Ok(());
        }
        if w == 0.0 || h == 0.0 || !(w.is_finite() && h.is_finite()) {
            return Ok(());
        }
        let (iw, ih) = (f64::from(image.width()), f64::from(image.height()));
        let transform = Affine::translate(state.translation)
            * Affine::translate((x, y))
            * Affine::rotate(-rotation_deg.to_radians())
            * Affine::scale_non_uniform(w / iw, h / ih);
        let Some(inverse) = invert(transform) else {
            return Ok(());
        };
        let quad = transform * Rect::new(0.0, 0.0, iw, ih).to_path(0.1);
        self.paint_path(
            &quad,
            FillRule::NonZero,
            Paint::Image {
                image,
                inverse,
                smooth: interpolate,
            },
        )?;
        self.end_draw();
        Ok(())
    }

    /// Replay a recorded group onto the current target through `transform`.
    pub fn use_group(&mut self, key: ResourceKey, transform: Affine) -> DeviceResult<()> {
        let state = *self.top();
        if let Target::Clip(_) = state.target {
            tracing::debug!(%key, "group ignored while recording a clip");
            return Ok(());
        }
        let Some(group) = self.groups.get(key) else {
            tracing::warn!(%key, "unknown group");
            return Ok(());
        };
        let area = Rect::new(
            0.0,
            0.0,
            f64::from(group.destination().width()),
            f64::from(group.destination().height()),
        );
        let full = Affine::translate(state.translation) * transform;
        let Some(inverse) = invert(full) else {
            return Ok(());
        };
        let path = full * area.to_path(0.1);
        self.paint_path(
            &path,
            FillRule::NonZero,
            Paint::Group {
                key,
                inverse,
                smooth: transform != Affine::IDENTITY,
            },
        )?;
        self.end_draw();
        Ok(())
    }

    fn append_clip_geometry(&mut self, index: usize, path: &BezPath) {
        match self.recordings.get_mut(index) {
            Some(Recording::Clip { rec, .. }) => rec.concat_path(path),
            _ => tracing::warn!(index, "clip target is not on the recording stack"),
        }
    }

    /// Rasterize `path` (already in target space) and composite `paint` through it.
    pub(crate) fn paint_path(
        &mut self,
        path: &BezPath,
        rule: FillRule,
        paint: Paint<'_>,
    ) -> DeviceResult<()> {
        let state = *self.top();
        if state.clip_rect.is_empty() {
            return Ok(());
        }
        let mut coverage = self.rasterizer.rasterize(path, rule, state.clip_rect)?;
        if coverage.is_empty() {
            return Ok(());
        }
        if let Some(clip) = state.clip.and_then(|key| self.clips.get_mut(key)) {
            coverage.intersect(clip.coverage(self.rasterizer.as_mut(), state.bounds)?);
            if coverage.is_empty() {
                return Ok(());
            }
        }

        self.paint_coverage(&state, &coverage, paint)
    }

    /// Close one draw call. Inside a capturing group, the fill and stroke passes of the call
    /// land in the capture buffer first and are blended onto the destination here, once.
    fn end_draw(&mut self) {
        if let Target::Group(index) = self.top().target
            && let Some(Recording::Group { group, .. }) = self.recordings.get_mut(index)
        {
            group.blend_capture();
        }
    }

    fn paint_coverage(
        &mut self,
        state: &RenderState,
        coverage: &Coverage,
        paint: Paint<'_>,
    ) -> DeviceResult<()> {
        let Self {
            surface,
            recordings,
            masks,
            patterns,
            groups,
            ..
        } = self;

        let rgba_target = matches!(state.target, Target::Mask(_) | Target::Group(_));
        let converted;
        let shader = match paint {
            Paint::Solid(c) => Shader::Solid(c),
            Paint::Pattern(key) => match patterns.get(key) {
                Some(p)
                    if rgba_target
                        && p
                            .tile_buffer()
                            .is_some_and(|b| b.layout() != PixelLayout::Rgba8Premul) =>
                {
                    converted = p.convert_for_mask()?;
                    Shader::Pattern(&converted)
                }
                Some(p) => Shader::Pattern(p),
                None => return Ok(()),
            },
            Paint::Group {
                key,
                inverse,
                smooth,
            } => match groups.get(key) {
                Some(g) => Shader::Sampled {
                    buffer: g.destination(),
                    inverse,
                    smooth,
                    wrap: Wrap::Transparent,
                },
                None => return Ok(()),
            },
            Paint::Image {
                image,
                inverse,
                smooth,
            } => Shader::Sampled {
                buffer: image,
                inverse,
                smooth,
                wrap: Wrap::Clamp,
            },
        };
        let consumed_mask = state.mask.and_then(|key| masks.get(key));

        let stale = || {
            DeviceError::render(format!(
                "render target {:?} is not on the recording stack",
                state.target
            ))
        };
        let (target, renderer) = match state.target {
            Target::Surface => (surface, Renderer::Normal),
            Target::Clip(_) => return Ok(()),
            Target::Mask(i) => match recordings.get_mut(i) {
                Some(Recording::Mask { mask, .. }) => (mask.buffer_mut(), Renderer::Normal),
                _ => return Err(stale()),
            },
            Target::Tile(i) => match recordings.get_mut(i) {
                Some(Recording::Tile { pattern, .. }) => match pattern.tile_buffer_mut() {
                    Some(buffer) => (buffer, Renderer::Normal),
                    None => return Err(stale()),
                },
                _ => return Err(stale()),
            },
            Target::Group(i) => match recordings.get_mut(i) {
                Some(Recording::Group { group, .. }) => group.capture_target(),
                _ => return Err(stale()),
            },
        };

        let mut covers = Vec::new();
        let mut colors = Vec::new();
        for span in coverage.spans() {
            covers.clear();
            covers.extend_from_slice(span.covers);
            if let Some(mask) = consumed_mask {
                mask.apply(span.y, span.x0, &mut covers);
            }
            shader.fill_span(span.y, span.x0, covers.len(), state.translation, &mut colors);
            target.blend_span(span.y, span.x0, &covers, &colors, renderer);
        }
        Ok(())
    }
}

fn invert(t: Affine) -> Option<Affine> {
    let det = t.determinant();
    (det.is_finite() && det.abs() > 1e-12).then(|| t.inverse())
}

#[cfg(test)]
#[path = "../../tests/unit/device/dispatch.rs"]
mod tests;
