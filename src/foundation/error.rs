/// Result alias used throughout the device.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Errors surfaced to the host.
///
/// Unknown resource keys are not errors: they are logged and treated as "no resource".
#[derive(thiserror::Error, Debug)]
pub enum DeviceError {
    /// Invalid input (dimensions, scene documents, malformed descriptors).
    #[error("validation error: {0}")]
    Validation(String),

    /// An offscreen buffer could not be allocated. Fatal for the current operation.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// A recording callback failed. Device state has already been restored.
    #[error("recording error: {0}")]
    Recording(String),

    /// Internal rendering fault (buffer size mismatch and similar).
    #[error("render error: {0}")]
    Render(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeviceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    pub fn recording(msg: impl Into<String>) -> Self {
        Self::Recording(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// `true` for errors that must abort the current page.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Allocation(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
