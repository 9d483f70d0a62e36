pub(crate) mod cache;
pub(crate) mod clip;
pub(crate) mod group;
pub(crate) mod mask;
