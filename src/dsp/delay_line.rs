//! # Delay Line Bank (Ring Buffers)
//!
//! The cascade needs one delay line per tap. All of them are read and
//! written at the same position, so instead of a read head and a write
//! head per line, the bank keeps a single shared `head` index:
//!
//! ```text
//!            head
//!             ▼
//! tap 0  [ . . x . . . . . | (unused up to capacity) ]
//! tap 1  [ . . x . . . . . |                         ]
//! ...          ▲
//!  0     effective_length ─┘                  capacity (1 s)
//! ```
//!
//! Each buffer holds one second of audio. The delay time only moves the
//! point where the head wraps (`effective_length`); the buffers are never
//! resized after [`configure()`](DelayLineBank::configure), so changing
//! the delay time never allocates.
//!
//! A sample written at `head` is read back the next time the head comes
//! around, i.e. exactly `effective_length` samples later.

use nih_plug::nih_debug_assert;

use super::sample::Sample;
use super::MAX_TAPS;
use crate::error::ConfigureError;

/// `MAX_TAPS` ring buffers of one second each, plus the shared head.
///
/// Empty until [`configure()`](Self::configure) is called with the host's
/// sample rate. Lifecycle calls (`configure`, `release`) belong to the
/// host's non-realtime callbacks; everything else is realtime safe.
#[derive(Debug)]
pub struct DelayLineBank<S: Sample> {
    /// One boxed slice per tap. Boxed slices cannot grow, which keeps the
    /// capacity fixed for the lifetime of a configuration.
    lines: Vec<Box<[S]>>,

    /// Shared read/write position, always `< effective_length` of the
    /// block currently being processed.
    head: usize,

    /// Samples per line (`ceil(sample_rate)`), 0 when released.
    capacity: usize,

    sample_rate: f32,
}

impl<S: Sample> Default for DelayLineBank<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Sample> DelayLineBank<S> {
    /// An unconfigured bank. It owns no memory until [`configure()`](Self::configure).
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            head: 0,
            capacity: 0,
            sample_rate: 0.0,
        }
    }

    /// Allocate `MAX_TAPS` zeroed lines of `ceil(sample_rate)` samples.
    ///
    /// Any previous configuration is dropped. The memory is reserved with
    /// `try_reserve_exact`, so an allocation failure is reported to the
    /// caller instead of aborting the host.
    pub fn configure(&mut self, sample_rate: f32) -> Result<(), ConfigureError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(ConfigureError::InvalidSampleRate(sample_rate));
        }

        let capacity = sample_rate.ceil() as usize;

        // Release first so the old and new buffers never coexist.
        self.release();

        let mut lines = Vec::new();
        lines.try_reserve_exact(MAX_TAPS)?;
        for _ in 0..MAX_TAPS {
            let mut line = Vec::new();
            line.try_reserve_exact(capacity)?;
            line.resize(capacity, S::ZERO);
            lines.push(line.into_boxed_slice());
        }

        self.lines = lines;
        self.capacity = capacity;
        self.sample_rate = sample_rate;
        self.head = 0;

        Ok(())
    }

    /// Free all line memory and forget the sample rate, leaving the bank as
    /// [`new()`](Self::new) built it. Calling it on a released bank does
    /// nothing.
    pub fn release(&mut self) {
        self.lines = Vec::new();
        self.capacity = 0;
        self.head = 0;
        self.sample_rate = 0.0;
    }

    /// Zero every line and rewind the head, keeping the allocation.
    pub fn clear(&mut self) {
        for line in &mut self.lines {
            line.fill(S::ZERO);
        }
        self.head = 0;
    }

    pub fn is_configured(&self) -> bool {
        self.capacity > 0
    }

    /// Samples per line: one second at the configured sample rate.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The sample rate passed to the last successful `configure()`.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn head(&self) -> usize {
        self.head
    }

    #[inline]
    pub fn tap_read(&self, tap: usize, position: usize) -> S {
        nih_debug_assert!(tap < self.lines.len(), "tap {} out of range", tap);
        nih_debug_assert!(position < self.capacity, "position {} out of range", position);
        self.lines[tap][position]
    }

    #[inline]
    pub fn tap_write(&mut self, tap: usize, position: usize, value: S) {
        nih_debug_assert!(tap < self.lines.len(), "tap {} out of range", tap);
        nih_debug_assert!(position < self.capacity, "position {} out of range", position);
        self.lines[tap][position] = value;
    }

    /// Step the shared head forward, wrapping at `effective_length`.
    ///
    /// `effective_length` must be at least 1; callers derive it from
    /// [`cascade::effective_length()`](super::cascade::effective_length),
    /// which never returns 0.
    #[inline]
    pub fn advance_head(&mut self, effective_length: usize) -> usize {
        nih_debug_assert!(effective_length > 0);
        self.head = (self.head + 1) % effective_length.max(1);
        self.head
    }

    /// Bring the head back into `0..effective_length` after the delay time
    /// shrank. The head is not reset, only wrapped.
    #[inline]
    pub fn rewrap_head(&mut self, effective_length: usize) {
        if self.head >= effective_length {
            self.head %= effective_length.max(1);
        }
    }
}
