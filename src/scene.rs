pub(crate) mod color;
pub(crate) mod model;
pub(crate) mod play;

pub use color::ColorDef;
pub use model::{CanvasDef, Command, PatternDef, SceneDoc, StopDef, StyleDef};
pub use play::{play, render_scene};
