use crate::device::state::{Recording, Target};
use crate::device::{Device, SceneFn};
use crate::foundation::core::{FillRule, Point, ResourceKey};
use crate::foundation::error::{DeviceError, DeviceResult};
use crate::paint::pattern::{Pattern, PatternDesc};
use crate::render::buffer::{BufferBudget, PixelLayout};
use crate::render::composite::CompositeOp;
use crate::resource::cache::ResourceCache;
use crate::resource::clip::ClipRecording;
use crate::resource::group::Group;
use crate::resource::mask::{Mask, MaskMode};

/// How a `create_*` call resolves its requested key.
enum KeyRequest {
    /// Negative explicit key: nothing is created.
    Skip,
    /// The key is already cached; reuse without recording.
    Existing(ResourceKey),
    /// Record a new payload under this key.
    Create(ResourceKey),
}

/// A key whose recording is still on the stack has no payload yet, so it cannot be
/// requested again from inside its own sub-scene.
fn resolve_key<T>(
    cache: &mut ResourceCache<T>,
    recordings: &[Recording],
    requested: Option<ResourceKey>,
) -> DeviceResult<KeyRequest> {
    Ok(match requested {
        Some(key) if !key.is_some() => KeyRequest::Skip,
        Some(key) if cache.contains(key) => KeyRequest::Existing(key),
        Some(key)
            if recordings
                .iter()
                .any(|r| r.kind() == cache.kind() && r.key() == key) =>
        {
            return Err(DeviceError::validation(format!(
                "{} {key} is referenced while it is being recorded",
                cache.kind()
            )));
        }
        other => KeyRequest::Create(cache.allocate_key(other)),
    })
}

fn release_entries<T>(
    cache: &mut ResourceCache<T>,
    budget: &mut BufferBudget,
    key: Option<ResourceKey>,
    byte_len: impl Fn(&T) -> usize,
) {
    let removed = cache.release(key);
    match key {
        None => tracing::debug!(kind = %cache.kind(), count = removed.len(), "released all"),
        Some(key) if removed.is_empty() => {
            tracing::debug!(kind = %cache.kind(), %key, "release of unknown key ignored")
        }
        Some(key) => tracing::debug!(kind = %cache.kind(), %key, "released"),
    }
    for payload in &removed {
        budget.release(byte_len(payload));
    }
}

fn store<T>(
    cache: &mut ResourceCache<T>,
    budget: &mut BufferBudget,
    key: ResourceKey,
    payload: T,
    byte_len: impl Fn(&T) -> usize,
) {
    if let Some(old) = cache.insert(key, payload) {
        budget.release(byte_len(&old));
    }
    tracing::debug!(kind = %cache.kind(), %key, "recorded");
}

impl Device {
    /// Push `recording` as the active target, run `scene`, and pop everything the call
    /// pushed, whether or not it succeeded.
    fn record(&mut self, recording: Recording, scene: &mut SceneFn<'_>) -> DeviceResult<Recording> {
        let kind = recording.kind();
        let key = recording.key();
        let index = self.recordings.len();
        let depth = self.stack.len();
        let state = recording.initial_state(index, self.top(), self.surface_bounds());

        self.recordings.push(recording);
        self.stack.push(state);
        let result = scene(self);
        self.stack.truncate(depth);
        self.recordings.truncate(index + 1);
        let recording = self.recordings.pop();

        match (result, recording) {
            (Ok(()), Some(recording)) => Ok(recording),
            (Ok(()), None) => Err(DeviceError::render(format!(
                "{kind} recording {key} vanished from the recording stack"
            ))),
            (Err(err), recording) => {
                if let Some(recording) = recording {
                    self.budget.release(recording.byte_len());
                }
                tracing::warn!(%kind, %key, error = %err, "recording failed");
                Err(match err {
                    DeviceError::Allocation(_) | DeviceError::Recording(_) => err,
                    other => DeviceError::recording(format!("{kind} {key}: {other}")),
                })
            }
        }
    }

    /// Record a clip path from `scene` and make it the active clip.
    ///
    /// Everything the scene draws contributes geometry only; no pixels are written.
    pub fn create_clip(
        &mut self,
        scene: &mut SceneFn<'_>,
        rule: FillRule,
        key: Option<ResourceKey>,
    ) -> DeviceResult<ResourceKey> {
        let key = match resolve_key(&mut self.clips, &self.recordings, key)? {
            KeyRequest::Skip => return Ok(ResourceKey::NONE),
            KeyRequest::Existing(key) => {
                tracing::debug!(%key, "reusing clip");
                self.activate_clip(key);
                return Ok(key);
            }
            KeyRequest::Create(key) => key,
        };

        let recording = Recording::Clip {
            key,
            rec: ClipRecording::default(),
        };
        let Recording::Clip { rec, .. } = self.record(recording, scene)? else {
            return Err(DeviceError::render("clip recording changed kind"));
        };
        store(&mut self.clips, &mut self.budget, key, rec.finish(rule), |_| 0);
        self.activate_clip(key);
        Ok(key)
    }

    /// Make `key` the active clip path, or deactivate path clipping for the sentinel.
    ///
    /// Activation resets the rectangular clip to the bounds of the current target.
    pub fn activate_clip(&mut self, key: ResourceKey) {
        if !key.is_some() {
            self.top_mut().clip = None;
            return;
        }
        if !self.clips.contains(key) {
            tracing::warn!(%key, "unknown clip; drawing unclipped");
            self.top_mut().clip = None;
            return;
        }
        let state = self.top_mut();
        state.clip = Some(key);
        state.clip_rect = state.bounds;
    }

    pub fn release_clip(&mut self, key: Option<ResourceKey>) {
        release_entries(&mut self.clips, &mut self.budget, key, |_| 0);
    }

    /// Record a soft mask from `scene` and make it the active mask.
    pub fn create_mask(
        &mut self,
        scene: &mut SceneFn<'_>,
        mode: MaskMode,
        key: Option<ResourceKey>,
    ) -> DeviceResult<ResourceKey> {
        let key = match resolve_key(&mut self.masks, &self.recordings, key)? {
            KeyRequest::Skip => return Ok(ResourceKey::NONE),
            KeyRequest::Existing(key) => {
                tracing::debug!(%key, "reusing mask");
                self.activate_mask(key);
                return Ok(key);
            }
            KeyRequest::Create(key) => key,
        };

        let (w, h) = (self.width(), self.height());
        let buffer = self.budget.allocate(w, h, PixelLayout::Rgba8Premul)?;
        let recording = Recording::Mask {
            key,
            mask: Mask::new(buffer, mode),
        };
        let Recording::Mask { mask, .. } = self.record(recording, scene)? else {
            return Err(DeviceError::render("mask recording changed kind"));
        };
        store(&mut self.masks, &mut self.budget, key, mask, Mask::byte_len);
        self.activate_mask(key);
        Ok(key)
    }

    /// Make `key` the active mask, or stop masking for the sentinel.
    pub fn activate_mask(&mut self, key: ResourceKey) {
        if key.is_some() && !self.masks.contains(key) {
            tracing::warn!(%key, "unknown mask; drawing unmasked");
            self.top_mut().mask = None;
            return;
        }
        self.top_mut().mask = key.valid();
    }

    pub fn release_mask(&mut self, key: Option<ResourceKey>) {
        release_entries(&mut self.masks, &mut self.budget, key, Mask::byte_len);
    }

    /// Create a gradient or tile pattern.
    ///
    /// Tiles record `scene` (when given) into a buffer of the device layout, with the
    /// tile's top-left corner at the origin of the recording. Gradients ignore `scene`.
    pub fn create_pattern(
        &mut self,
        desc: &PatternDesc,
        scene: Option<&mut SceneFn<'_>>,
        key: Option<ResourceKey>,
    ) -> DeviceResult<ResourceKey> {
        let key = match resolve_key(&mut self.patterns, &self.recordings, key)? {
            KeyRequest::Skip => return Ok(ResourceKey::NONE),
            KeyRequest::Existing(key) => {
                tracing::debug!(%key, "reusing pattern");
                return Ok(key);
            }
            KeyRequest::Create(key) => key,
        };

        let mut pattern = match desc {
            PatternDesc::Linear {
                x1,
                y1,
                x2,
                y2,
                stops,
                extend,
            } => {
                let mut p = Pattern::linear(Point::new(*x1, *y1), Point::new(*x2, *y2), *extend);
                for stop in stops {
                    p.add_stop(stop.offset, stop.color);
                }
                p
            }
            PatternDesc::Radial {
                cx1,
                cy1,
                r1,
                cx2,
                cy2,
                r2,
                stops,
                extend,
            } => {
                let mut p = Pattern::radial(
                    Point::new(*cx1, *cy1),
                    *r1,
                    Point::new(*cx2, *cy2),
                    *r2,
                    *extend,
                );
                for stop in stops {
                    p.add_stop(stop.offset, stop.color);
                }
                p
            }
            PatternDesc::Tile {
                width,
                height,
                x,
                y,
                extend,
            } => {
                let layout = self.opts.layout;
                let buffer = self.budget.allocate(*width, *height, layout)?;
                let pattern = Pattern::tile(buffer, Point::new(*x, *y), *extend);
                match scene {
                    Some(scene) => {
                        let recording = Recording::Tile { key, pattern };
                        let Recording::Tile { pattern, .. } = self.record(recording, scene)? else {
                            return Err(DeviceError::render("tile recording changed kind"));
                        };
                        pattern
                    }
                    None => pattern,
                }
            }
        };
        pattern.finish();

        store(&mut self.patterns, &mut self.budget, key, pattern, Pattern::byte_len);
        Ok(key)
    }

    pub fn release_pattern(&mut self, key: Option<ResourceKey>) {
        release_entries(&mut self.patterns, &mut self.budget, key, Pattern::byte_len);
    }

    /// Record a compositing group.
    ///
    /// `destination` is drawn first with source-over. `source` is then drawn with `op`,
    /// either directly or, for operators that also affect uncovered destination pixels,
    /// through a capture buffer blended over the whole surface after every draw call.
    #[tracing::instrument(skip(self, source, destination))]
    pub fn define_group(
        &mut self,
        source: &mut SceneFn<'_>,
        op: CompositeOp,
        destination: Option<&mut SceneFn<'_>>,
        key: Option<ResourceKey>,
    ) -> DeviceResult<ResourceKey> {
        let key = match resolve_key(&mut self.groups, &self.recordings, key)? {
            KeyRequest::Skip => return Ok(ResourceKey::NONE),
            KeyRequest::Existing(key) => {
                tracing::debug!(%key, "reusing group");
                return Ok(key);
            }
            KeyRequest::Create(key) => key,
        };
        let (w, h) = (self.width(), self.height());

        let dst = self.budget.allocate(w, h, PixelLayout::Rgba8Premul)?;
        let mut group = Group::new(CompositeOp::Over, dst, None);
        if let Some(destination) = destination {
            let recording = Recording::Group { key, group };
            let Recording::Group { group: recorded, .. } = self.record(recording, destination)?
            else {
                return Err(DeviceError::render("group recording changed kind"));
            };
            group = recorded;
        }
        let dst = group.into_destination();

        let src = if op.requires_dst_clip() {
            match self.budget.allocate(w, h, PixelLayout::Rgba8Premul) {
                Ok(src) => Some(src),
                Err(err) => {
                    self.budget.release(dst.byte_len());
                    return Err(err);
                }
            }
        } else {
            None
        };

        let recording = Recording::Group {
            key,
            group: Group::new(op, dst, src),
        };
        let Recording::Group { mut group, .. } = self.record(recording, source)? else {
            return Err(DeviceError::render("group recording changed kind"));
        };
        let freed = group.finish();
        self.budget.release(freed);

        store(&mut self.groups, &mut self.budget, key, group, Group::byte_len);
        Ok(key)
    }

    pub fn release_group(&mut self, key: Option<ResourceKey>) {
        release_entries(&mut self.groups, &mut self.budget, key, Group::byte_len);
    }

    /// `true` while draw calls only contribute clip geometry.
    pub fn is_recording_clip(&self) -> bool {
        matches!(self.top().target, Target::Clip(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/device/record.rs"]
mod tests;
