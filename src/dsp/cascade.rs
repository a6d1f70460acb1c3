//! # The Tap Cascade
//!
//! A chain of delay lines where each tap feeds the next one, losing a
//! fraction of the signal (`attenuation`) on every hop:
//!
//! ```text
//!        ┌──────── × (1 - att) ─────────┐  ┌── × (1 - att) ──┐
//! dry ───┤                              ▼  │                 ▼
//!        │                          [tap 0]┴──► [tap 1] ──► ... ──► [tap N-1]
//!        │                              │          │                   │
//!        │                              └──────────┴─────── + ─────────┘
//!        │                                                  │
//!        └── × dry_level ──────────► (+) ◄──── × wet_level ─┘ ──► every channel
//! ```
//!
//! All taps are read and written at the bank's shared head. Taps are
//! visited from the last to the first, so tap `k` emits its stored value
//! before tap `k - 1`'s value from one ring period ago overwrites it. A
//! sample entering tap 0 therefore reaches the output `L, 2L, 3L, ...`
//! samples later (`L` = effective length), each time scaled by another
//! `(1 - attenuation)`: a train of decaying echoes rather than one tap
//! repeated.
//!
//! The input channels are summed into a single dry value and the mixed
//! result is written to every channel, so the output is mono.

use super::controls::CascadeParams;
use super::delay_line::DelayLineBank;
use super::sample::Sample;
use super::MAX_TAPS;

/// Ring length in samples for `delay_time` seconds.
///
/// Never 0 (a zero delay becomes a one-sample delay) and never more than
/// the bank's `capacity`.
pub fn effective_length(delay_time: f32, sample_rate: f32, capacity: usize) -> usize {
    let samples = (delay_time * sample_rate).round();
    // `as` saturates: NaN and negatives land on 0, then get lifted to 1.
    (samples as usize).clamp(1, capacity.max(1))
}

/// Samples until a sample written now has left the last active tap.
///
/// Reported to the host as the effect's tail, so it keeps calling
/// `process()` after the input stops.
pub fn tail_length(params: &CascadeParams, sample_rate: f32, capacity: usize) -> u32 {
    let length = effective_length(params.delay_time, sample_rate, capacity);
    let taps = params.tap_count.clamp(1, MAX_TAPS);
    u32::try_from(length * taps).unwrap_or(u32::MAX)
}

/// Run one block through the cascade, in place.
///
/// `channels` holds one slice per channel. Frames are processed up to the
/// shortest channel. An unconfigured bank leaves the block untouched.
///
/// The head persists in `bank` across calls. If the delay time shrank since
/// the previous block, the head is wrapped into the new ring first.
pub fn process_block<S: Sample>(
    bank: &mut DelayLineBank<S>,
    params: &CascadeParams,
    channels: &mut [&mut [S]],
) {
    if !bank.is_configured() || channels.is_empty() {
        return;
    }

    let length = effective_length(params.delay_time, bank.sample_rate(), bank.capacity());
    bank.rewrap_head(length);

    let taps = params.tap_count.clamp(1, MAX_TAPS);
    let feed = S::from_f32(1.0 - params.attenuation);
    let dry_level = S::from_f32(params.dry_level);
    let wet_level = S::from_f32(params.wet_level);

    let frames = channels.iter().map(|channel| channel.len()).min().unwrap_or(0);

    for frame in 0..frames {
        let dry = channels
            .iter()
            .fold(S::ZERO, |sum, channel| sum + channel[frame]);

        let wet = process_sample(bank, taps, feed, dry);
        let mixed = dry * dry_level + wet * wet_level;

        for channel in channels.iter_mut() {
            channel[frame] = mixed;
        }

        bank.advance_head(length);
    }
}

/// One step of the cascade at the current head. Returns the summed tap
/// output (the wet signal) before mixing.
#[inline]
fn process_sample<S: Sample>(bank: &mut DelayLineBank<S>, taps: usize, feed: S, dry: S) -> S {
    let head = bank.head();
    let mut wet = S::ZERO;

    for tap in (1..taps).rev() {
        wet += bank.tap_read(tap, head);
        let upstream = bank.tap_read(tap - 1, head);
        bank.tap_write(tap, head, upstream * feed);
    }

    wet += bank.tap_read(0, head);
    bank.tap_write(0, head, dry * feed);

    wet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::controls::{ParamId, ParameterSet};

    const SAMPLE_RATE: f32 = 1000.0;

    fn configured_bank<S: Sample>() -> DelayLineBank<S> {
        let mut bank = DelayLineBank::new();
        bank.configure(SAMPLE_RATE).unwrap();
        bank
    }

    fn params(tap_count: usize, delay_time: f32, attenuation: f32, dry: f32, wet: f32) -> CascadeParams {
        CascadeParams {
            tap_count,
            delay_time,
            attenuation,
            dry_level: dry,
            wet_level: wet,
        }
    }

    /// Run a mono signal through the cascade in blocks of `block_size`.
    fn render(
        bank: &mut DelayLineBank<f32>,
        params: &CascadeParams,
        input: &[f32],
        block_size: usize,
    ) -> Vec<f32> {
        let mut output = input.to_vec();
        for block in output.chunks_mut(block_size) {
            process_block(bank, params, &mut [block]);
        }
        output
    }

    fn impulse(len: usize) -> Vec<f32> {
        let mut signal = vec![0.0; len];
        signal[0] = 1.0;
        signal
    }

    #[test]
    fn test_effective_length_rounds_and_clamps() {
        assert_eq!(effective_length(0.5, 44100.0, 44100), 22050);
        assert_eq!(effective_length(0.0, 44100.0, 44100), 1);
        assert_eq!(effective_length(1.0, 44100.0, 44100), 44100);
        assert_eq!(effective_length(0.00001, 44100.0, 44100), 1);
        // 0.3 * 1000 is 300.00003 in f32.
        assert_eq!(effective_length(0.3, 1000.0, 1000), 300);
        assert_eq!(effective_length(2.0, 1000.0, 1000), 1000);
        assert_eq!(effective_length(f32::NAN, 1000.0, 1000), 1);
        assert_eq!(effective_length(0.5, 1000.0, 0), 1);
    }

    #[test]
    fn test_silence_in_silence_out_for_every_tap_count() {
        for tap_count in 1..=MAX_TAPS {
            let mut bank = configured_bank::<f32>();
            let p = params(tap_count, 0.01, 0.3, 1.0, 1.0);

            for _ in 0..50 {
                let mut left = [0.0_f32; 64];
                let mut right = [0.0_f32; 64];
                process_block(&mut bank, &p, &mut [&mut left[..], &mut right[..]]);

                assert!(
                    left.iter().chain(right.iter()).all(|s| *s == 0.0),
                    "tap count {tap_count} produced sound from silence"
                );
            }
        }
    }

    #[test]
    fn test_single_tap_is_a_pure_delay() {
        let mut bank = configured_bank::<f32>();
        let p = params(1, 0.1, 0.0, 0.0, 1.0);
        let length = effective_length(0.1, SAMPLE_RATE, bank.capacity());
        assert_eq!(length, 100);

        let output = render(&mut bank, &p, &impulse(350), 32);

        for (i, sample) in output.iter().enumerate() {
            let expected: f32 = if i == length { 1.0 } else { 0.0 };
            assert!(
                (sample - expected).abs() < 1e-6,
                "sample {i}: expected {expected}, got {sample}"
            );
        }
    }

    #[test]
    fn test_echo_train_decays_per_hop() {
        let mut bank = configured_bank::<f32>();
        let p = params(3, 0.05, 0.5, 0.0, 1.0);
        let length: usize = 50;

        let output = render(&mut bank, &p, &impulse(250), 64);

        // Tap 0 stores dry * 0.5; every further hop halves it again. Tap k
        // emits one ring period after receiving, so echo k lands at (k+1)L.
        let expected = [(length, 0.5_f32), (2 * length, 0.25), (3 * length, 0.125)];
        for (i, sample) in output.iter().enumerate() {
            let want = expected
                .iter()
                .find(|(at, _)| *at == i)
                .map_or(0.0, |(_, amp)| *amp);
            assert!(
                (sample - want).abs() < 1e-6,
                "sample {i}: expected {want}, got {sample}"
            );
        }
    }

    #[test]
    fn test_tail_length_covers_echo_train() {
        let p = params(3, 0.05, 0.5, 0.0, 1.0);
        assert_eq!(tail_length(&p, SAMPLE_RATE, 1000), 150);

        let p = params(MAX_TAPS, 1.0, 0.0, 1.0, 1.0);
        assert_eq!(tail_length(&p, 48000.0, 48000), 48000 * MAX_TAPS as u32);
    }

    #[test]
    fn test_full_attenuation_silences_the_wet_path() {
        let mut bank = configured_bank::<f32>();
        let p = params(5, 0.01, 1.0, 0.5, 1.0);

        let input: Vec<f32> = (0..500).map(|i| ((i % 7) as f32 - 3.0) * 0.1).collect();
        let output = render(&mut bank, &p, &input, 50);

        for (i, (out, inp)) in output.iter().zip(&input).enumerate() {
            assert!(
                (out - inp * 0.5).abs() < 1e-6,
                "sample {i}: expected dry only ({}), got {out}",
                inp * 0.5
            );
        }
        for tap in 0..MAX_TAPS {
            for position in 0..bank.capacity() {
                assert_eq!(bank.tap_read(tap, position), 0.0);
            }
        }
    }

    #[test]
    fn test_channels_are_summed_and_broadcast() {
        let mut bank = configured_bank::<f32>();
        let p = params(2, 0.1, 0.0, 0.5, 0.0);

        let mut left = [0.2_f32, 0.4, -0.6];
        let mut right = [0.6_f32, 0.0, 0.2];
        process_block(&mut bank, &p, &mut [&mut left[..], &mut right[..]]);

        let expected = [0.4_f32, 0.2, -0.2];
        for i in 0..3 {
            assert!((left[i] - expected[i]).abs() < 1e-6);
            assert_eq!(left[i], right[i], "channels should be identical");
        }
    }

    #[test]
    fn test_zero_delay_survives_many_blocks() {
        let mut bank = configured_bank::<f32>();
        let p = params(4, 0.0, 0.5, 1.0, 1.0);

        for block in 0..10_000 {
            let mut samples = [(block % 3) as f32 * 0.1; 16];
            process_block(&mut bank, &p, &mut [&mut samples[..]]);
            assert_eq!(bank.head(), 0);
            assert!(samples.iter().all(|s| s.is_finite()));
        }
    }

    #[test]
    fn test_zero_delay_is_a_one_sample_delay() {
        let mut bank = configured_bank::<f32>();
        let p = params(1, 0.0, 0.0, 0.0, 1.0);

        let output = render(&mut bank, &p, &[1.0, 0.0, 0.0, 0.0], 4);
        assert_eq!(output, vec![0.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_tap_count_change_mid_stream() {
        const MARKER: f32 = 0.123;

        let controls = ParameterSet::new();
        controls.set(ParamId::DelayTime, 0.02);

        // Two banks with the same history; only `marked` gets markers.
        let mut marked = configured_bank::<f32>();
        let mut plain = configured_bank::<f32>();

        let input: Vec<f32> = (0..40).map(|i| (i as f32 * 0.37).sin()).collect();
        for _ in 0..10 {
            for bank in [&mut marked, &mut plain] {
                let mut block = input.clone();
                process_block(bank, &controls.snapshot(), &mut [block.as_mut_slice()]);
            }
        }

        controls.set(ParamId::TapCount, 2.0);
        let snapshot = controls.snapshot();
        assert_eq!(snapshot.tap_count, 2);

        // Taps past the new count must be neither read nor written.
        for tap in 2..5 {
            for position in 0..marked.capacity() {
                marked.tap_write(tap, position, MARKER);
            }
        }

        for _ in 0..10 {
            let mut marked_block = input.clone();
            let mut plain_block = input.clone();
            process_block(&mut marked, &snapshot, &mut [marked_block.as_mut_slice()]);
            process_block(&mut plain, &snapshot, &mut [plain_block.as_mut_slice()]);

            assert_eq!(marked_block, plain_block);
        }

        for tap in 2..5 {
            for position in 0..marked.capacity() {
                assert_eq!(marked.tap_read(tap, position), MARKER, "tap {tap} at {position}");
            }
        }
    }

    #[test]
    fn test_shrinking_delay_rewraps_head() {
        let mut bank = configured_bank::<f32>();
        let mut block = [0.1_f32; 70];
        process_block(&mut bank, &params(3, 0.5, 0.2, 1.0, 1.0), &mut [&mut block[..]]);
        assert_eq!(bank.head(), 70);

        let mut block = [0.1_f32; 5];
        process_block(&mut bank, &params(3, 0.03, 0.2, 1.0, 1.0), &mut [&mut block[..]]);
        // 70 wraps to 10 in a 30-sample ring, then advances by 5.
        assert_eq!(bank.head(), 15);
    }

    #[test]
    fn test_unconfigured_bank_passes_block_through() {
        let mut bank = DelayLineBank::<f32>::new();
        let mut block = [0.25_f32, -0.5];
        process_block(&mut bank, &CascadeParams::default(), &mut [&mut block[..]]);
        assert_eq!(block, [0.25, -0.5]);
    }

    #[test]
    fn test_f64_matches_f32_on_exact_values() {
        let p = params(3, 0.01, 0.5, 1.0, 1.0);

        let mut bank32 = configured_bank::<f32>();
        let mut bank64 = configured_bank::<f64>();

        let mut in32: Vec<f32> = (0..40).map(|i| if i % 10 == 0 { 1.0 } else { 0.0 }).collect();
        let mut in64: Vec<f64> = in32.iter().map(|s| f64::from(*s)).collect();

        process_block(&mut bank32, &p, &mut [in32.as_mut_slice()]);
        process_block(&mut bank64, &p, &mut [in64.as_mut_slice()]);

        // Powers of two survive both formats exactly.
        for (a, b) in in32.iter().zip(&in64) {
            assert_eq!(f64::from(*a), *b);
        }
    }
}
