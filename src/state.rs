//! # Saved State
//!
//! The control values are saved as a fixed 20-byte record, little-endian,
//! no header and no padding:
//!
//! ```text
//! offset  0  i32  lines
//! offset  4  f32  delay_time
//! offset  8  f32  attenuation
//! offset 12  f32  dry
//! offset 16  f32  wet
//! ```
//!
//! Restoring is forgiving. A short record restores the fields it fully
//! contains and leaves the rest alone; trailing bytes are ignored; values
//! are clamped into range like any other `set`.
//!
//! The record is saved next to nih-plug's own per-parameter values. On
//! load, [`merge_into_params()`] folds the record into those values before
//! nih-plug applies them, so the host-visible parameters and the control
//! values the audio thread reads always agree.

use std::sync::Arc;

use nih_plug::nih_warn;
use nih_plug::params::persist::{self, PersistentField};
use nih_plug::wrapper::state::{ParamValue, PluginState};

use crate::dsp::controls::{ParamId, ParameterSet, NUM_PARAMS};

/// Key of the byte record in the plugin's persisted fields.
pub const STATE_KEY: &str = "cascade-state";

const FIELD_LEN: usize = 4;

/// Size of a complete saved record.
pub const STATE_LEN: usize = FIELD_LEN * NUM_PARAMS;

/// Encode the current control values.
pub fn save(controls: &ParameterSet) -> [u8; STATE_LEN] {
    let mut bytes = [0; STATE_LEN];

    for (param, field) in ParamId::ALL.into_iter().zip(bytes.chunks_exact_mut(FIELD_LEN)) {
        let encoded = match param {
            ParamId::TapCount => (controls.tap_count() as i32).to_le_bytes(),
            _ => controls.get(param).to_le_bytes(),
        };
        field.copy_from_slice(&encoded);
    }

    bytes
}

/// Apply a saved record to `controls`. Returns the number of fields that
/// were applied; anything less than [`NUM_PARAMS`] means the record was
/// truncated or held NaN values.
pub fn restore(controls: &ParameterSet, bytes: &[u8]) -> usize {
    let mut applied = 0;

    for (param, field) in ParamId::ALL.into_iter().zip(bytes.chunks_exact(FIELD_LEN)) {
        let mut raw = [0; FIELD_LEN];
        raw.copy_from_slice(field);

        match param {
            ParamId::TapCount => {
                controls.set_tap_count(i32::from_le_bytes(raw));
                applied += 1;
            }
            _ => {
                if controls.set(param, f32::from_le_bytes(raw)) {
                    applied += 1;
                }
            }
        }
    }

    applied
}

/// Fold the saved byte record into the per-parameter values of a state
/// the host is about to load.
///
/// Parameters start from the values already in `state.params`, then the
/// record's fields overwrite them with the usual clamping. A short record
/// only overwrites the fields it holds. The record is rewritten in full so
/// the later `PersistentField::set` agrees with the parameters.
///
/// Returns the number of record fields applied.
pub fn merge_into_params(state: &mut PluginState) -> usize {
    let Some(data) = state.fields.get(STATE_KEY) else {
        return 0;
    };
    let bytes: Vec<u8> = match persist::deserialize_field(data) {
        Ok(bytes) => bytes,
        Err(err) => {
            nih_warn!("Ignoring unreadable saved state: {}", err);
            return 0;
        }
    };

    let merged = ParameterSet::new();
    for param in ParamId::ALL {
        match (param, state.params.get(param.id())) {
            (ParamId::TapCount, Some(ParamValue::I32(value))) => merged.set_tap_count(*value),
            (_, Some(ParamValue::F32(value))) => {
                merged.set(param, *value);
            }
            _ => (),
        }
    }

    let applied = restore(&merged, &bytes);

    for param in ParamId::ALL {
        let value = match param {
            ParamId::TapCount => ParamValue::I32(merged.tap_count() as i32),
            _ => ParamValue::F32(merged.get(param)),
        };
        state.params.insert(param.id().to_string(), value);
    }
    match persist::serialize_field(&save(&merged).to_vec()) {
        Ok(data) => {
            state.fields.insert(STATE_KEY.to_string(), data);
        }
        Err(err) => nih_warn!("Could not rewrite saved state: {}", err),
    }

    applied
}

/// Hooks the saved record into nih-plug's state persistence.
///
/// Stored in the params struct under `#[persist]`; nih-plug calls `map`
/// when the host saves a session and `set` when it loads one.
pub struct PersistedState {
    controls: Arc<ParameterSet>,
}

impl PersistedState {
    pub fn new(controls: Arc<ParameterSet>) -> Self {
        Self { controls }
    }
}

impl<'a> PersistentField<'a, Vec<u8>> for PersistedState {
    fn set(&self, new_value: Vec<u8>) {
        let applied = restore(&self.controls, &new_value);
        if applied < NUM_PARAMS {
            nih_warn!(
                "Saved state held {} bytes, restored {} of {} values",
                new_value.len(),
                applied,
                NUM_PARAMS
            );
        }
    }

    fn map<F, R>(&self, f: F) -> R
    where
        F: Fn(&Vec<u8>) -> R,
    {
        f(&save(&self.controls).to_vec())
    }
}
