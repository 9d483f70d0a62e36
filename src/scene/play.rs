use crate::device::{Device, SceneFn};
use crate::foundation::core::{Affine, BezPath, PremulRgba8, Rgba8};
use crate::foundation::error::{DeviceError, DeviceResult};
use crate::render::FrameRGBA;
use crate::render::buffer::{PixelLayout, RenderBuffer};
use crate::scene::color::ColorDef;
use crate::scene::model::{Command, SceneDoc, points};

/// Play every command of `doc` against `device`.
#[tracing::instrument(skip(doc, device), fields(commands = doc.commands.len()))]
pub fn play(doc: &SceneDoc, device: &mut Device) -> DeviceResult<()> {
    play_commands(&doc.commands, device)
}

/// Render `doc` on a fresh device and return its last page.
pub fn render_scene(doc: &SceneDoc) -> DeviceResult<FrameRGBA> {
    let mut device = Device::new(doc.device_opts())?;
    play(doc, &mut device)?;
    Ok(device.close())
}

fn play_commands(commands: &[Command], dev: &mut Device) -> DeviceResult<()> {
    for cmd in commands {
        play_command(cmd, dev)?;
    }
    Ok(())
}

fn sub_scene(commands: &[Command]) -> impl FnMut(&mut Device) -> DeviceResult<()> + '_ {
    move |dev: &mut Device| play_commands(commands, dev)
}

fn polygon_path(polys: &[Vec<[f64; 2]>]) -> Vec<BezPath> {
    polys
        .iter()
        .filter(|p| p.len() >= 2)
        .map(|p| {
            let mut path = BezPath::new();
            let pts = points(p);
            path.move_to(pts[0]);
            for &pt in &pts[1..] {
                path.line_to(pt);
            }
            path.close_path();
            path
        })
        .collect()
}

fn image_buffer(width: u32, height: u32, pixels: &[ColorDef]) -> DeviceResult<RenderBuffer> {
    let expected = (width as usize).saturating_mul(height as usize);
    if pixels.len() != expected {
        return Err(DeviceError::validation(format!(
            "image has {} pixels, expected {expected} for {width}x{height}",
            pixels.len()
        )));
    }
    let data = pixels
        .iter()
        .flat_map(|c| PremulRgba8::from_straight(c.to_rgba8()).to_array())
        .collect();
    RenderBuffer::from_data(width, height, PixelLayout::Rgba8Premul, data)
}

fn play_command(cmd: &Command, dev: &mut Device) -> DeviceResult<()> {
    match cmd {
        Command::Rect {
            x0,
            y0,
            x1,
            y1,
            style,
        } => dev.draw_rect(*x0, *y0, *x1, *y1, &style.to_draw_style()),
        Command::Circle { cx, cy, r, style } => {
            dev.draw_circle(*cx, *cy, *r, &style.to_draw_style())
        }
        Command::Polygon { points: p, style } => {
            dev.draw_polygon(&points(p), &style.to_draw_style())
        }
        Command::Polyline { points: p, style } => {
            dev.draw_polyline(&points(p), &style.to_draw_style())
        }
        Command::Line {
            x1,
            y1,
            x2,
            y2,
            style,
        } => dev.draw_line(*x1, *y1, *x2, *y2, &style.to_draw_style()),
        Command::Path {
            polygons,
            even_odd,
            style,
        } => {
            let polys: Vec<_> = polygons.iter().map(|p| points(p)).collect();
            dev.draw_path(&polys, *even_odd, &style.to_draw_style())
        }
        Command::Text { glyphs, color } => {
            dev.draw_text(&polygon_path(glyphs), color.to_rgba8())
        }
        Command::Image {
            width,
            height,
            pixels,
            x,
            y,
            w,
            h,
            rotation,
            interpolate,
        } => {
            let image = image_buffer(*width, *height, pixels)?;
            dev.draw_image(&image, *x, *y, *w, *h, *rotation, *interpolate)
        }
        Command::ClipRect { x0, y0, x1, y1 } => {
            dev.clip_rect(*x0, *y0, *x1, *y1);
            Ok(())
        }
        Command::Clip { key, rule, scene } => {
            dev.create_clip(&mut sub_scene(scene), *rule, *key)?;
            Ok(())
        }
        Command::ActivateClip { key } => {
            dev.activate_clip(*key);
            Ok(())
        }
        Command::ReleaseClip { key } => {
            dev.release_clip(*key);
            Ok(())
        }
        Command::Mask { key, mode, scene } => {
            dev.create_mask(&mut sub_scene(scene), *mode, *key)?;
            Ok(())
        }
        Command::ActivateMask { key } => {
            dev.activate_mask(*key);
            Ok(())
        }
        Command::ReleaseMask { key } => {
            dev.release_mask(*key);
            Ok(())
        }
        Command::Pattern {
            key,
            pattern,
            scene,
        } => {
            let mut tile = scene.as_deref().map(sub_scene);
            let scene = tile.as_mut().map(|f| f as &mut SceneFn<'_>);
            dev.create_pattern(&pattern.to_desc(), scene, *key)?;
            Ok(())
        }
        Command::ReleasePattern { key } => {
            dev.release_pattern(*key);
            Ok(())
        }
        Command::Group {
            key,
            operator,
            source,
            destination,
        } => {
            let mut dst = destination.as_deref().map(sub_scene);
            let dst = dst.as_mut().map(|f| f as &mut SceneFn<'_>);
            dev.define_group(&mut sub_scene(source), *operator, dst, *key)?;
            Ok(())
        }
        Command::UseGroup { key, transform } => {
            let t = transform.map_or(Affine::IDENTITY, Affine::new);
            dev.use_group(*key, t)
        }
        Command::ReleaseGroup { key } => {
            dev.release_group(*key);
            Ok(())
        }
        Command::NewPage { background } => {
            dev.new_page(background.map_or(Rgba8::TRANSPARENT, ColorDef::to_rgba8))
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/play.rs"]
mod tests;
