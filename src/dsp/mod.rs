//! # DSP (Digital Signal Processing) Core
//!
//! Everything that runs on, or sizes memory for, the audio thread:
//!
//! - **`delay_line`**: [`DelayLineBank`](delay_line::DelayLineBank), one
//!   ring buffer per tap sharing a single write head.
//! - **`cascade`**: the per-sample tap cascade and dry/wet mix.
//! - **`controls`**: the lock-free control values the cascade reads once
//!   per block.
//! - **`sample`**: the sample formats the cascade is instantiated for.

pub mod cascade;
pub mod controls;
pub mod delay_line;
pub mod sample;

/// Upper bound on the number of cascaded taps. Every tap buffer is
/// allocated up front, so this also bounds the memory footprint:
/// `MAX_TAPS` seconds of audio.
pub const MAX_TAPS: usize = 16;
