//! # Plugin Parameters
//!
//! The host-facing side of the five controls. Each nih-plug parameter is
//! built from the matching [`ParamDescriptor`](crate::dsp::controls::ParamDescriptor)
//! and carries a callback that forwards every change (automation, the
//! host's generic UI, preset loads) into the shared [`ParameterSet`]. The
//! audio thread never reads these parameters directly; it reads a
//! [`ParameterSet::snapshot()`] at the top of each block.
//!
//! The `#[id = "..."]` strings must match the descriptor ids. Once
//! published, never change them or existing sessions will not restore.

use std::sync::Arc;

use nih_plug::prelude::*;

use crate::dsp::controls::{ParamId, ParameterSet};
use crate::state::PersistedState;

#[derive(Params)]
pub struct PluginParams {
    /// The fixed-layout byte record of all five controls, saved alongside
    /// nih-plug's own per-parameter state.
    #[persist = "cascade-state"]
    pub state: PersistedState,

    /// **Lines**: how many taps the cascade runs through. Each extra tap
    /// adds one more, quieter echo one delay period later.
    #[id = "lines"]
    pub tap_count: IntParam,

    /// **Delay Time**: spacing between echoes, as a fraction of a second.
    /// Zero is a one-sample delay.
    #[id = "delay_time"]
    pub delay_time: FloatParam,

    /// **Attenuation**: fraction of the signal lost on each hop to the next
    /// tap. At 100% only the dry signal remains.
    #[id = "attenuation"]
    pub attenuation: FloatParam,

    #[id = "dry"]
    pub dry: FloatParam,

    #[id = "wet"]
    pub wet: FloatParam,
}

impl PluginParams {
    pub fn new(controls: Arc<ParameterSet>) -> Self {
        let lines = ParamId::TapCount.descriptor();
        let tap_controls = Arc::clone(&controls);

        Self {
            state: PersistedState::new(Arc::clone(&controls)),

            tap_count: IntParam::new(
                lines.display_name,
                lines.default as i32,
                IntRange::Linear {
                    min: lines.min as i32,
                    max: lines.max as i32,
                },
            )
            .with_callback(Arc::new(move |value: i32| tap_controls.set_tap_count(value))),

            delay_time: float_param(ParamId::DelayTime, &controls)
                .with_unit(" s")
                .with_step_size(0.001)
                .with_value_to_string(formatters::v2s_f32_rounded(3)),

            attenuation: percentage_param(ParamId::Attenuation, &controls),
            dry: percentage_param(ParamId::DryLevel, &controls),
            wet: percentage_param(ParamId::WetLevel, &controls),
        }
    }
}

/// A linear `FloatParam` over the descriptor's range whose changes are
/// forwarded to `controls`.
fn float_param(param: ParamId, controls: &Arc<ParameterSet>) -> FloatParam {
    let descriptor = param.descriptor();
    let controls = Arc::clone(controls);

    FloatParam::new(
        descriptor.display_name,
        descriptor.default,
        FloatRange::Linear {
            min: descriptor.min,
            max: descriptor.max,
        },
    )
    .with_callback(Arc::new(move |value: f32| {
        controls.set(param, value);
    }))
}

/// Displayed as a percentage: 0.6 → "60.0%".
fn percentage_param(param: ParamId, controls: &Arc<ParameterSet>) -> FloatParam {
    float_param(param, controls)
        .with_unit("%")
        .with_value_to_string(formatters::v2s_f32_percentage(1))
        .with_string_to_value(formatters::s2v_f32_percentage())
}
