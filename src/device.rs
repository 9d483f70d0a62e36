//! The rendering device: page surface, resource caches and the render-state stack.
//!
//! Every draw call is routed by the state on top of the stack. Recording a clip, mask,
//! tile or group pushes a fresh state whose target is the offscreen payload, runs the
//! host callback against the same device, and pops the state again.

pub(crate) mod capabilities;
mod dispatch;
pub(crate) mod opts;
mod primitives;
mod record;
pub(crate) mod state;

pub use dispatch::DrawStyle;

use crate::device::capabilities::Capabilities;
use crate::device::opts::DeviceOpts;
use crate::device::state::{Recording, RenderState, Target};
use crate::foundation::core::{ResourceKey, Rgba8, Vec2};
use crate::foundation::error::{DeviceError, DeviceResult};
use crate::paint::pattern::Pattern;
use crate::render::FrameRGBA;
use crate::render::buffer::{BufferBudget, BufferStats, RenderBuffer};
use crate::render::raster::{PixelRect, Rasterizer, VelloRasterizer};
use crate::resource::cache::{ResourceCache, ResourceKind};
use crate::resource::clip::Clip;
use crate::resource::group::Group;
use crate::resource::mask::Mask;

/// Host callback that draws a sub-scene into whatever the device is currently recording.
pub type SceneFn<'a> = dyn FnMut(&mut Device) -> DeviceResult<()> + 'a;

pub struct Device {
    opts: DeviceOpts,
    surface: RenderBuffer,
    budget: BufferBudget,
    rasterizer: Box<dyn Rasterizer>,
    clips: ResourceCache<Clip>,
    masks: ResourceCache<Mask>,
    patterns: ResourceCache<Pattern>,
    groups: ResourceCache<Group>,
    base: RenderState,
    stack: Vec<RenderState>,
    recordings: Vec<Recording>,
    page: u32,
    lwd_scale: f64,
}

impl std::fmt::Debug for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Device")
            .field("width", &self.surface.width())
            .field("height", &self.surface.height())
            .field("page", &self.page)
            .field("depth", &self.stack.len())
            .finish()
    }
}

impl Device {
    #[tracing::instrument(skip(opts), fields(width = opts.width, height = opts.height))]
    pub fn new(opts: DeviceOpts) -> DeviceResult<Self> {
        Self::with_rasterizer(opts, Box::new(VelloRasterizer::new()))
    }

    /// Build a device around a custom scanline converter.
    pub fn with_rasterizer(
        opts: DeviceOpts,
        rasterizer: Box<dyn Rasterizer>,
    ) -> DeviceResult<Self> {
        opts.validate()?;
        let mut surface = RenderBuffer::new(opts.width, opts.height, opts.layout)?;
        surface.clear(opts.background.premultiply());
        let bounds = PixelRect::surface(opts.width, opts.height);

        Ok(Self {
            budget: BufferBudget::new(opts.max_offscreen_bytes),
            lwd_scale: opts.line_width_scale(),
            surface,
            rasterizer,
            clips: ResourceCache::new(ResourceKind::Clip),
            masks: ResourceCache::new(ResourceKind::Mask),
            patterns: ResourceCache::new(ResourceKind::Pattern),
            groups: ResourceCache::new(ResourceKind::Group),
            base: RenderState::new(Target::Surface, bounds, Vec2::ZERO),
            stack: Vec::new(),
            recordings: Vec::new(),
            page: 0,
            opts,
        })
    }

    pub fn opts(&self) -> &DeviceOpts {
        &self.opts
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    pub fn page_number(&self) -> u32 {
        self.page
    }

    /// Start a new page: reset the render state and clear to `background`, or to the
    /// device background when `background` is fully transparent.
    pub fn new_page(&mut self, background: Rgba8) -> DeviceResult<()> {
        if !self.recordings.is_empty() {
            return Err(DeviceError::validation(
                "new_page is not allowed while a recording is in progress",
            ));
        }
        let bg = if background.is_visible() {
            background
        } else {
            self.opts.background
        };
        self.stack.clear();
        self.base = RenderState::new(Target::Surface, self.surface_bounds(), Vec2::ZERO);
        self.surface.clear(bg.premultiply());
        self.page = self.page.saturating_add(1);
        tracing::debug!(page = self.page, "new page");
        Ok(())
    }

    /// Drop every cached resource and return the final page.
    pub fn close(&mut self) -> FrameRGBA {
        self.release_clip(None);
        self.release_mask(None);
        self.release_pattern(None);
        self.release_group(None);
        self.stack.clear();
        self.base = RenderState::new(Target::Surface, self.surface_bounds(), Vec2::ZERO);
        self.surface.to_frame()
    }

    /// Straight-alpha copy of the page surface.
    pub fn capture(&self) -> FrameRGBA {
        self.surface.to_frame()
    }

    pub fn surface(&self) -> &RenderBuffer {
        &self.surface
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::current()
    }

    pub fn buffer_stats(&self) -> BufferStats {
        self.budget.stats()
    }

    /// Copy of the state currently routing draw calls.
    pub fn state_snapshot(&self) -> RenderState {
        *self.top()
    }

    /// Live entries of one resource kind.
    pub fn resource_count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Clip => self.clips.len(),
            ResourceKind::Mask => self.masks.len(),
            ResourceKind::Pattern => self.patterns.len(),
            ResourceKind::Group => self.groups.len(),
        }
    }

    /// The key the next automatic allocation of `kind` will return.
    pub fn next_key(&self, kind: ResourceKind) -> ResourceKey {
        match kind {
            ResourceKind::Clip => self.clips.next_key(),
            ResourceKind::Mask => self.masks.next_key(),
            ResourceKind::Pattern => self.patterns.next_key(),
            ResourceKind::Group => self.groups.next_key(),
        }
    }

    pub fn pattern(&self, key: ResourceKey) -> Option<&Pattern> {
        self.patterns.get(key)
    }

    pub fn mask(&self, key: ResourceKey) -> Option<&Mask> {
        self.masks.get(key)
    }

    pub fn group(&self, key: ResourceKey) -> Option<&Group> {
        self.groups.get(key)
    }

    pub fn clip(&self, key: ResourceKey) -> Option<&Clip> {
        self.clips.get(key)
    }

    /// Restrict drawing to an axis-aligned rectangle and drop any active clip path.
    pub fn clip_rect(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        let state = self.top_mut();
        let t = state.translation;
        let r = crate::foundation::core::Rect::new(x0 + t.x, y0 + t.y, x1 + t.x, y1 + t.y);
        state.clip_rect = PixelRect::from_rect(r, state.bounds);
        state.clip = None;
    }

    fn surface_bounds(&self) -> PixelRect {
        PixelRect::surface(self.surface.width(), self.surface.height())
    }

    fn top(&self) -> &RenderState {
        self.stack.last().unwrap_or(&self.base)
    }

    fn top_mut(&mut self) -> &mut RenderState {
        self.stack.last_mut().unwrap_or(&mut self.base)
    }
}

#[cfg(test)]
#[path = "../tests/unit/device/device.rs"]
mod tests;
