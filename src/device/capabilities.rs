use serde::{Deserialize, Serialize};

use crate::paint::pattern::{ExtendMode, PatternKind};
use crate::render::composite::CompositeOp;
use crate::resource::mask::MaskMode;

/// What the device supports, reported to the host once at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Capabilities {
    pub patterns: Vec<PatternKind>,
    pub extend_modes: Vec<ExtendMode>,
    pub mask_modes: Vec<MaskMode>,
    pub composite_ops: Vec<CompositeOp>,
    pub clipping_paths: bool,
    pub groups: bool,
    pub glyphs: bool,
}

impl Capabilities {
    pub fn current() -> Self {
        Self {
            patterns: vec![
                PatternKind::LinearGradient,
                PatternKind::RadialGradient,
                PatternKind::Tile,
            ],
            extend_modes: ExtendMode::ALL.to_vec(),
            mask_modes: MaskMode::ALL.to_vec(),
            composite_ops: CompositeOp::ALL.to_vec(),
            clipping_paths: true,
            groups: true,
            glyphs: true,
        }
    }

    pub fn supports_op(&self, op: CompositeOp) -> bool {
        self.composite_ops.contains(&op)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/device/capabilities.rs"]
mod tests;
