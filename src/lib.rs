//! # Loveless Cascade: A Multi-Tap Diffusion Delay
//!
//! A cascaded delay built with [nih-plug](https://github.com/robbert-vdh/nih-plug),
//! exported as CLAP, VST3 and (on macOS) AUv2. Up to
//! [`MAX_TAPS`](dsp::MAX_TAPS) delay lines are chained so that every echo
//! feeds the next one, each a little quieter.
//!
//! ## Signal Flow
//!
//! ```text
//!            ┌──────────────────────────────────────────── × dry ───┐
//! L ─┐       │                                                      │
//!    ├─(+)───┼─► [tap 0] ─► [tap 1] ─► ... ─► [tap N-1]             ▼
//! R ─┘       │      │          │                  │                (+)──┬─► L
//!            │      └──────────┴───── (+) ────────┘── × wet ───────►    └─► R
//!            │         each hop × (1 - attenuation)
//! ```
//!
//! The input channels are summed to mono before entering the cascade and
//! the mixed result is written back to every channel.
//!
//! ## Threads
//!
//! - The host (automation, UI, state loading) writes control values into a
//!   shared [`ParameterSet`] through the nih-plug parameter callbacks.
//! - The audio thread reads one snapshot of those values per block and
//!   owns the delay lines exclusively. Allocation happens only in
//!   `initialize()`, never in `process()`.

pub mod dsp;
pub mod error;
mod params;
pub mod state;

use std::num::NonZeroU32;
use std::sync::Arc;

use dsp::cascade;
use dsp::controls::ParameterSet;
use dsp::delay_line::DelayLineBank;
use nih_plug::prelude::*;
use nih_plug::wrapper::state::PluginState;
use nih_plug::{nih_error, nih_log};
use params::PluginParams;

struct LovelessCascade {
    /// Host-facing parameters. Their callbacks write into `controls`.
    params: Arc<PluginParams>,

    /// The control values the audio thread reads once per block.
    controls: Arc<ParameterSet>,

    /// One delay line per tap, allocated in `initialize()` and freed in
    /// `deactivate()`. Only ever touched from the audio thread in between.
    bank: DelayLineBank<f32>,
}

impl Default for LovelessCascade {
    fn default() -> Self {
        let controls = Arc::new(ParameterSet::new());

        Self {
            params: Arc::new(PluginParams::new(Arc::clone(&controls))),
            controls,
            // Empty until the host tells us the sample rate.
            bank: DelayLineBank::new(),
        }
    }
}

impl Plugin for LovelessCascade {
    const NAME: &'static str = "Loveless Cascade";
    const VENDOR: &'static str = "Loveless Audio";
    const URL: &'static str = "";
    const EMAIL: &'static str = "";
    const VERSION: &'static str = env!("CARGO_PKG_VERSION");

    // Stereo first, mono as a fallback. The cascade itself does not care
    // about the channel count: it sums every input and writes every output.
    const AUDIO_IO_LAYOUTS: &'static [AudioIOLayout] = &[
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(2),
            main_output_channels: NonZeroU32::new(2),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
        AudioIOLayout {
            main_input_channels: NonZeroU32::new(1),
            main_output_channels: NonZeroU32::new(1),
            aux_input_ports: &[],
            aux_output_ports: &[],
            names: PortNames::const_default(),
        },
    ];

    const MIDI_INPUT: MidiConfig = MidiConfig::None;

    // Control values are read once per block, so automation lands on block
    // boundaries. Splitting blocks at automation points would gain nothing.
    const SAMPLE_ACCURATE_AUTOMATION: bool = false;

    type SysExMessage = ();
    type BackgroundTask = ();

    fn params(&self) -> Arc<dyn Params> {
        self.params.clone()
    }

    /// Runs before nih-plug applies a loaded state. The byte record wins
    /// over the per-parameter values, so fold it into them here; the
    /// parameters then push the merged values into `controls` through
    /// their callbacks.
    fn filter_state(loaded: &mut PluginState) {
        let applied = state::merge_into_params(loaded);
        if applied > 0 {
            nih_log!("Restored {} values from the saved record", applied);
        }
    }

    /// Allocate the delay lines for the host's sample rate.
    ///
    /// Returning `false` tells the host the plugin cannot run with this
    /// configuration, which is what an unusable sample rate or a failed
    /// allocation amounts to.
    fn initialize(
        &mut self,
        _audio_io_layout: &AudioIOLayout,
        buffer_config: &BufferConfig,
        _context: &mut impl InitContext<Self>,
    ) -> bool {
        match self.bank.configure(buffer_config.sample_rate) {
            Ok(()) => {
                nih_log!(
                    "Allocated {} taps of {} samples at {} Hz (max block {})",
                    dsp::MAX_TAPS,
                    self.bank.capacity(),
                    buffer_config.sample_rate,
                    buffer_config.max_buffer_size
                );
                true
            }
            Err(err) => {
                nih_error!("Cannot initialize: {}", err);
                false
            }
        }
    }

    /// Called when playback (re)starts. Silences the delay lines so old
    /// echoes do not replay.
    fn reset(&mut self) {
        self.bank.clear();
    }

    fn deactivate(&mut self) {
        self.bank.release();
        nih_log!("Released delay lines");
    }

    fn process(
        &mut self,
        buffer: &mut Buffer,
        _aux: &mut AuxiliaryBuffers,
        _context: &mut impl ProcessContext<Self>,
    ) -> ProcessStatus {
        let snapshot = self.controls.snapshot();

        cascade::process_block(&mut self.bank, &snapshot, buffer.as_slice());

        // Once the input stops, the last echo leaves the final tap after
        // `tap_count` delay periods.
        ProcessStatus::Tail(cascade::tail_length(
            &snapshot,
            self.bank.sample_rate(),
            self.bank.capacity(),
        ))
    }
}

impl ClapPlugin for LovelessCascade {
    const CLAP_ID: &'static str = "com.loveless-audio.loveless-cascade";
    const CLAP_DESCRIPTION: Option<&'static str> =
        Some("A cascaded multi-tap delay with per-tap attenuation");
    const CLAP_MANUAL_URL: Option<&'static str> = None;
    const CLAP_SUPPORT_URL: Option<&'static str> = None;
    const CLAP_FEATURES: &'static [ClapFeature] = &[
        ClapFeature::AudioEffect,
        ClapFeature::Stereo,
        ClapFeature::Mono,
        ClapFeature::Delay,
    ];
}

impl Vst3Plugin for LovelessCascade {
    // `*b"..."` turns the 16-character ASCII literal into a `[u8; 16]`.
    const VST3_CLASS_ID: [u8; 16] = *b"LvlssCascade_v01";

    const VST3_SUBCATEGORIES: &'static [Vst3SubCategory] =
        &[Vst3SubCategory::Fx, Vst3SubCategory::Delay];
}

nih_export_clap!(LovelessCascade);
nih_export_vst3!(LovelessCascade);

// Re-export the CLAP entry point as an AUv2 component for Logic Pro.
#[cfg(target_os = "macos")]
clap_wrapper::export_auv2!();
