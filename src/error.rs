//! Errors raised while preparing the delay lines.
//!
//! These only ever occur in `initialize()`, before the host starts calling
//! `process()`. The audio path itself has no error cases: out-of-range
//! controls are clamped when they are set, and a zero-length ring is
//! ruled out by the delay time clamp.

use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigureError {
    /// The host reported a sample rate that cannot size a buffer: zero,
    /// negative, NaN or infinite.
    #[error("unusable sample rate {0} Hz")]
    InvalidSampleRate(f32),

    /// The one-second tap buffers could not be reserved.
    #[error("failed to allocate delay lines: {0}")]
    Allocation(#[from] TryReserveError),
}
