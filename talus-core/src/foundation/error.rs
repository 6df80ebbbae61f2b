/// Convenience result type used across Talus.
pub type TalusResult<T> = Result<T, TalusError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Every variant except [`TalusError::Other`] describes a per-item failure:
/// batch runners catch these at the item boundary, log them, and move on to
/// the next pair. Collaborator failures that make the whole run pointless
/// (an unwritable output store, for instance) travel through `Other` and
/// propagate.
#[derive(thiserror::Error, Debug)]
pub enum TalusError {
    /// Invalid configuration or user-provided parameter.
    #[error("validation error: {0}")]
    Validation(String),

    /// No mask (or image) counterpart exists for a stem.
    #[error("missing counterpart for '{0}'")]
    MissingCounterpart(String),

    /// A named buffer exists but cannot be read or decoded.
    #[error("unreadable buffer '{0}': {1}")]
    UnreadableBuffer(String, String),

    /// Image and mask spatial dimensions disagree.
    #[error("dimension mismatch: image {image_w}x{image_h} vs mask {mask_w}x{mask_h}")]
    DimensionMismatch {
        /// Image width in pixels.
        image_w: u32,
        /// Image height in pixels.
        image_h: u32,
        /// Mask width in pixels.
        mask_w: u32,
        /// Mask height in pixels.
        mask_h: u32,
    },

    /// Channel count outside the supported 1/3/4 set.
    #[error("unsupported channel layout: {0} channels")]
    UnsupportedChannelLayout(u8),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TalusError {
    /// Build a [`TalusError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TalusError::MissingCounterpart`] value.
    pub fn missing_counterpart(stem: impl Into<String>) -> Self {
        Self::MissingCounterpart(stem.into())
    }

    /// Build a [`TalusError::UnreadableBuffer`] value.
    pub fn unreadable(name: impl Into<String>, cause: impl std::fmt::Display) -> Self {
        Self::UnreadableBuffer(name.into(), cause.to_string())
    }

    /// Build a [`TalusError::DimensionMismatch`] value.
    pub fn dimension_mismatch(image: (u32, u32), mask: (u32, u32)) -> Self {
        Self::DimensionMismatch {
            image_w: image.0,
            image_h: image.1,
            mask_w: mask.0,
            mask_h: mask.1,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
