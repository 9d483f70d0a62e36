use crate::foundation::core::{ResourceKey, Vec2};
use crate::paint::pattern::Pattern;
use crate::render::raster::PixelRect;
use crate::resource::cache::ResourceKind;
use crate::resource::clip::ClipRecording;
use crate::resource::group::Group;
use crate::resource::mask::Mask;

/// Where draw calls currently land.
///
/// Offscreen targets index into the device's recording stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    Surface,
    Clip(usize),
    Mask(usize),
    Tile(usize),
    Group(usize),
}

impl Target {
    pub fn is_recording(self) -> bool {
        self != Self::Surface
    }
}

/// One entry of the device state stack.
///
/// States are replaced wholesale, never shared: a recording pushes a fresh state and the
/// caller's state is back on top as soon as the recording returns.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    pub target: Target,
    /// Pixel bounds of the target buffer.
    pub bounds: PixelRect,
    /// Rectangular clip, always within `bounds`.
    pub clip_rect: PixelRect,
    pub clip: Option<ResourceKey>,
    pub mask: Option<ResourceKey>,
    /// Offset added to every incoming coordinate.
    pub translation: Vec2,
}

impl RenderState {
    pub(crate) fn new(target: Target, bounds: PixelRect, translation: Vec2) -> Self {
        Self {
            target,
            bounds,
            clip_rect: bounds,
            clip: None,
            mask: None,
            translation,
        }
    }
}

/// An in-flight recording. The payload moves into its cache only once the callback returns.
#[derive(Debug)]
pub(crate) enum Recording {
    Clip {
        key: ResourceKey,
        rec: ClipRecording,
    },
    Mask {
        key: ResourceKey,
        mask: Mask,
    },
    Tile {
        key: ResourceKey,
        pattern: Pattern,
    },
    Group {
        key: ResourceKey,
        group: Group,
    },
}

impl Recording {
    pub(crate) fn kind(&self) -> ResourceKind {
        match self {
            Self::Clip { .. } => ResourceKind::Clip,
            Self::Mask { .. } => ResourceKind::Mask,
            Self::Tile { .. } => ResourceKind::Pattern,
            Self::Group { .. } => ResourceKind::Group,
        }
    }

    pub(crate) fn key(&self) -> ResourceKey {
        match self {
            Self::Clip { key, .. }
            | Self::Mask { key, .. }
            | Self::Tile { key, .. }
            | Self::Group { key, .. } => *key,
        }
    }

    /// Offscreen bytes owned by the payload.
    pub(crate) fn byte_len(&self) -> usize {
        match self {
            Self::Clip { .. } => 0,
            Self::Mask { mask, .. } => mask.byte_len(),
            Self::Tile { pattern, .. } => pattern.byte_len(),
            Self::Group { group, .. } => group.byte_len(),
        }
    }

    /// The state a recording of this payload starts from, at stack index `index`.
    pub(crate) fn initial_state(
        &self,
        index: usize,
        parent: &RenderState,
        surface: PixelRect,
    ) -> RenderState {
        match self {
            Self::Clip { .. } => {
                RenderState::new(Target::Clip(index), parent.bounds, parent.translation)
            }
            Self::Mask { .. } => RenderState::new(Target::Mask(index), surface, parent.translation),
            Self::Group { .. } => {
                RenderState::new(Target::Group(index), surface, parent.translation)
            }
            Self::Tile { pattern, .. } => {
                let (w, h) = pattern
                    .tile_buffer()
                    .map_or((0, 0), |b| (b.width(), b.height()));
                let origin = pattern.tile_origin().unwrap_or_default();
                RenderState::new(
                    Target::Tile(index),
                    PixelRect::surface(w, h),
                    -origin.to_vec2(),
                )
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/device/state.rs"]
mod tests;
