use crate::foundation::core::{BezPath, FillRule};
use crate::foundation::error::DeviceResult;
use crate::render::raster::{Coverage, PixelRect, Rasterizer};

/// A recorded clip path.
///
/// The path is immutable once recorded; its coverage is rasterized on first use and reused
/// while the target bounds stay the same.
#[derive(Clone, Debug)]
pub struct Clip {
    path: BezPath,
    rule: FillRule,
    coverage: Option<(PixelRect, Coverage)>,
}

impl Clip {
    pub fn new(path: BezPath, rule: FillRule) -> Self {
        Self {
            path,
            rule,
            coverage: None,
        }
    }

    pub fn path(&self) -> &BezPath {
        &self.path
    }

    pub fn rule(&self) -> FillRule {
        self.rule
    }

    pub(crate) fn coverage(
        &mut self,
        rasterizer: &mut dyn Rasterizer,
        limit: PixelRect,
    ) -> DeviceResult<&Coverage> {
        let cov = match self.coverage.take() {
            Some((bounds, cov)) if bounds == limit => cov,
            _ => rasterizer.rasterize(&self.path, self.rule, limit)?,
        };
        let (_, cov) = self.coverage.insert((limit, cov));
        Ok(cov)
    }
}

/// Geometry accumulated while a clip is being recorded.
#[derive(Clone, Debug, Default)]
pub(crate) struct ClipRecording {
    path: BezPath,
}

impl ClipRecording {
    /// Append every subpath of `path`.
    pub(crate) fn concat_path(&mut self, path: &BezPath) {
        for el in path.elements() {
            self.path.push(*el);
        }
    }

    pub(crate) fn finish(self, rule: FillRule) -> Clip {
        Clip::new(self.path, rule)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resource/clip.rs"]
mod tests;
