//! # Control Values
//!
//! The five values that shape the cascade, stored so the audio thread can
//! read them without taking a lock:
//!
//! | id            | name        | range           | default |
//! |---------------|-------------|-----------------|---------|
//! | `lines`       | Lines       | 1 ..= MAX_TAPS  | 5       |
//! | `delay_time`  | Delay Time  | 0.0 ..= 1.0 s   | 0.5     |
//! | `attenuation` | Attenuation | 0.0 ..= 1.0     | 0.6     |
//! | `dry`         | Dry         | 0.0 ..= 1.0     | 1.0     |
//! | `wet`         | Wet         | 0.0 ..= 1.0     | 1.0     |
//!
//! Each value lives in its own atomic cell. A writer (host automation, a
//! GUI, a state restore) stores one whole value; the audio thread loads
//! each value once per block through [`ParameterSet::snapshot()`]. There
//! is no ordering between fields, and none is needed: every field is
//! clamped into range when stored, so any combination the reader sees is
//! valid.

use std::sync::atomic::{AtomicI32, Ordering};

use atomic_float::AtomicF32;

use super::MAX_TAPS;

/// Number of values in a flat save/restore sequence.
pub const NUM_PARAMS: usize = 5;

/// The tunable values, in their persisted order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    TapCount,
    DelayTime,
    Attenuation,
    DryLevel,
    WetLevel,
}

/// Static description of one control, for whatever exposes it to a host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Stable identifier. Saved presets refer to controls by this id.
    pub id: &'static str,
    pub display_name: &'static str,
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamId {
    /// All controls in persisted order.
    pub const ALL: [ParamId; NUM_PARAMS] = [
        ParamId::TapCount,
        ParamId::DelayTime,
        ParamId::Attenuation,
        ParamId::DryLevel,
        ParamId::WetLevel,
    ];

    pub fn descriptor(self) -> ParamDescriptor {
        match self {
            ParamId::TapCount => ParamDescriptor {
                id: "lines",
                display_name: "Lines",
                min: 1.0,
                max: MAX_TAPS as f32,
                default: 5.0,
            },
            ParamId::DelayTime => ParamDescriptor {
                id: "delay_time",
                display_name: "Delay Time",
                min: 0.0,
                max: 1.0,
                default: 0.5,
            },
            ParamId::Attenuation => ParamDescriptor {
                id: "attenuation",
                display_name: "Attenuation",
                min: 0.0,
                max: 1.0,
                default: 0.6,
            },
            ParamId::DryLevel => ParamDescriptor {
                id: "dry",
                display_name: "Dry",
                min: 0.0,
                max: 1.0,
                default: 1.0,
            },
            ParamId::WetLevel => ParamDescriptor {
                id: "wet",
                display_name: "Wet",
                min: 0.0,
                max: 1.0,
                default: 1.0,
            },
        }
    }

    pub fn id(self) -> &'static str {
        self.descriptor().id
    }

    /// Look a control up by its stable string id.
    pub fn from_id(id: &str) -> Option<ParamId> {
        Self::ALL.into_iter().find(|param| param.id() == id)
    }

    /// Clamp `value` into this control's range. `None` for NaN, which has
    /// no meaningful place in any range.
    ///
    /// The tap count is rounded to the nearest whole tap.
    pub fn clamp(self, value: f32) -> Option<f32> {
        if value.is_nan() {
            return None;
        }

        let ParamDescriptor { min, max, .. } = self.descriptor();
        let value = match self {
            ParamId::TapCount => value.round(),
            _ => value,
        };

        Some(value.clamp(min, max))
    }
}

/// One block's worth of control values, read by the cascade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeParams {
    pub tap_count: usize,
    /// Fraction of one second.
    pub delay_time: f32,
    /// Fraction of the signal lost on every hop from one tap to the next.
    pub attenuation: f32,
    pub dry_level: f32,
    pub wet_level: f32,
}

impl Default for CascadeParams {
    fn default() -> Self {
        ParameterSet::default().snapshot()
    }
}

/// Lock-free storage for the five control values.
///
/// Shared between threads behind an `Arc`. Every store is clamped, so a
/// concurrent reader can never observe an out-of-range value.
#[derive(Debug)]
pub struct ParameterSet {
    /// Read as a single 32-bit word; a torn tap count could index past the
    /// allocated taps.
    tap_count: AtomicI32,
    delay_time: AtomicF32,
    attenuation: AtomicF32,
    dry_level: AtomicF32,
    wet_level: AtomicF32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            tap_count: AtomicI32::new(ParamId::TapCount.descriptor().default as i32),
            delay_time: AtomicF32::new(ParamId::DelayTime.descriptor().default),
            attenuation: AtomicF32::new(ParamId::Attenuation.descriptor().default),
            dry_level: AtomicF32::new(ParamId::DryLevel.descriptor().default),
            wet_level: AtomicF32::new(ParamId::WetLevel.descriptor().default),
        }
    }
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, param: ParamId) -> f32 {
        match param {
            ParamId::TapCount => self.tap_count.load(Ordering::Relaxed) as f32,
            ParamId::DelayTime => self.delay_time.load(Ordering::Relaxed),
            ParamId::Attenuation => self.attenuation.load(Ordering::Relaxed),
            ParamId::DryLevel => self.dry_level.load(Ordering::Relaxed),
            ParamId::WetLevel => self.wet_level.load(Ordering::Relaxed),
        }
    }

    /// Store `value`, clamped into the control's range.
    ///
    /// Returns `false` and keeps the previous value when `value` is NaN.
    pub fn set(&self, param: ParamId, value: f32) -> bool {
        let Some(value) = param.clamp(value) else {
            return false;
        };

        match param {
            ParamId::TapCount => self.tap_count.store(value as i32, Ordering::Relaxed),
            ParamId::DelayTime => self.delay_time.store(value, Ordering::Relaxed),
            ParamId::Attenuation => self.attenuation.store(value, Ordering::Relaxed),
            ParamId::DryLevel => self.dry_level.store(value, Ordering::Relaxed),
            ParamId::WetLevel => self.wet_level.store(value, Ordering::Relaxed),
        }

        true
    }

    /// Store an integer tap count without the float round trip.
    pub fn set_tap_count(&self, tap_count: i32) {
        self.tap_count
            .store(tap_count.clamp(1, MAX_TAPS as i32), Ordering::Relaxed);
    }

    pub fn tap_count(&self) -> usize {
        // Stores are clamped; the clamp here only guards the indexing.
        self.tap_count.load(Ordering::Relaxed).clamp(1, MAX_TAPS as i32) as usize
    }

    /// Read every value once. Called at the top of each audio block.
    pub fn snapshot(&self) -> CascadeParams {
        CascadeParams {
            tap_count: self.tap_count(),
            delay_time: self.delay_time.load(Ordering::Relaxed),
            attenuation: self.attenuation.load(Ordering::Relaxed),
            dry_level: self.dry_level.load(Ordering::Relaxed),
            wet_level: self.wet_level.load(Ordering::Relaxed),
        }
    }

    /// All values in persisted order:
    /// `[tap_count, delay_time, attenuation, dry_level, wet_level]`.
    pub fn serialize(&self) -> [f32; NUM_PARAMS] {
        ParamId::ALL.map(|param| self.get(param))
    }

    /// Apply `values` positionally. Values past the end of the slice, and
    /// NaN values, leave the corresponding control untouched. Extra values
    /// are ignored.
    ///
    /// Returns how many controls were updated.
    pub fn deserialize(&self, values: &[f32]) -> usize {
        ParamId::ALL
            .into_iter()
            .zip(values)
            .filter(|(param, value)| self.set(*param, **value))
            .count()
    }
}
