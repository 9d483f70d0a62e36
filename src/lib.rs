//! pixdev is the core of a 2D rendering device.
//!
//! Vector shapes, glyph outlines and images are drawn onto a CPU pixel surface, modified by
//! four composable resources:
//!
//! - clip paths, recorded once and intersected with every draw call
//! - soft masks (alpha or luminance), recorded offscreen and consumed as coverage
//! - patterns: linear and radial gradients and recorded tiles
//! - compositing groups, offscreen layers blended with any Porter-Duff or separable operator
//!
//! Resources are recorded by handing the [`Device`] a callback that draws a sub-scene into it.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod device;
pub(crate) mod paint;
pub(crate) mod render;
pub(crate) mod resource;
/// JSON scene documents played back against a device.
pub mod scene;

pub use crate::device::capabilities::Capabilities;
pub use crate::device::opts::DeviceOpts;
pub use crate::device::state::{RenderState, Target};
pub use crate::device::{Device, DrawStyle, SceneFn};
pub use crate::foundation::core::{
    Affine, BezPath, FillRule, Point, PremulRgba8, Rect, ResourceKey, Rgba8, Vec2,
};
pub use crate::foundation::error::{DeviceError, DeviceResult};
pub use crate::paint::gradient::ColorStop;
pub use crate::paint::pattern::{ExtendMode, Pattern, PatternDesc, PatternKind};
pub use crate::render::FrameRGBA;
pub use crate::render::buffer::{BufferStats, PixelLayout, RenderBuffer};
pub use crate::render::composite::CompositeOp;
pub use crate::render::raster::{Coverage, PixelRect, Rasterizer, VelloRasterizer};
pub use crate::render::stroke::{LineCap, LineJoin, LineType, StrokeStyle};
pub use crate::resource::cache::ResourceKind;
pub use crate::resource::clip::Clip;
pub use crate::resource::group::Group;
pub use crate::resource::mask::{Mask, MaskMode};
pub use crate::scene::{SceneDoc, play, render_scene};
