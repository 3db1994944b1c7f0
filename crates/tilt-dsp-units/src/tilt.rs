// SPDX-License-Identifier: LGPL-3.0-or-later

//! Spectral tilt filter: power-law magnitude slope over a frequency band.
//!
//! The filter approximates `|H(w)| ∝ w^a` between a lower and an upper
//! frequency, flattening outside the band. The slope exponent can be
//! given in neper-per-neper (the canonical internal unit), dB per octave
//! or dB per decade. Internally, an exponentially spaced series of real
//! poles and zeros is paired into analog biquads, gain-normalized at DC
//! or Nyquist, bilinear-transformed and committed to an [`SosChain`].
//!
//! Parameter changes are lazy: setters only mark the design stale, and
//! [`update_settings`](SpectralTilt::update_settings) rebuilds the
//! cascade. Processing never rebuilds a stale design — the host decides
//! when the (non-real-time-safe) redesign runs.

use std::f32::consts::PI;

use tilt_dsp_lib::transform::{bilinear_coefficient, bilinear_transform};
use tilt_dsp_lib::types::AnalogSos;
use tilt_dsp_lib::{copy, pmath};

use crate::chain::SosChain;

/// Maximum filter order (first-order analog sections).
const MAX_ORDER: usize = 100;

/// Fallback band bounds, applied when the configured band is invalid.
const DFL_LOWER_FREQUENCY: f32 = 0.1;
const DFL_UPPER_FREQUENCY: f32 = 20.0e3;

/// Chunk size for the streaming scratch buffer.
const BUF_LIM_SIZE: usize = 256;

/// dB/octave -> neper-per-neper: ln(10) / (20 * ln(2)).
///
/// The magnitude law `g * log_b1(b2^(x*a))` with `x = log_b2(w)` reduces
/// to the neper-per-neper exponent by `a_npn = ln(b1) * a / (g * ln(b2))`;
/// dB/octave has g = 20, b1 = 10, b2 = 2.
const DB_PER_OCTAVE_TO_NPN: f32 = 0.166_096_404;

/// dB/decade -> neper-per-neper: ln(10) / (20 * ln(10)) = 1/20.
const DB_PER_DECADE_TO_NPN: f32 = 0.05;

/// Unit in which the slope exponent is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlopeUnit {
    /// No slope: the filter is a bypass.
    None,
    /// Nepers per neper (dimensionless exponent `a` in `|H| ∝ w^a`).
    NeperPerNeper,
    /// Decibels per octave.
    DbPerOctave,
    /// Decibels per decade.
    DbPerDecade,
}

/// Where unity gain is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalization {
    /// At DC for non-positive slopes, at Nyquist otherwise.
    Auto,
    /// No normalization.
    None,
    /// Unity gain at DC.
    AtDc,
    /// Unity gain at the Nyquist frequency.
    AtNyquist,
}

/// Gain-normalized first-order analog section
/// `H(s) = (b1*s + b0) / (a1*s + a0)`.
#[derive(Debug, Clone, Copy)]
struct BilinearSpec {
    b0: f32,
    b1: f32,
    a0: f32,
    a1: f32,
}

/// Spectral tilt filter.
///
/// # Examples
///
/// ```
/// use tilt_dsp_units::tilt::{SlopeUnit, SpectralTilt};
///
/// let mut tilt = SpectralTilt::new();
/// tilt.set_sample_rate(48000.0)
///     .set_order(24)
///     .set_slope(-3.0)
///     .set_slope_unit(SlopeUnit::DbPerOctave);
/// tilt.update_settings();
///
/// let src = vec![1.0f32; 512];
/// let mut dst = vec![0.0f32; 512];
/// tilt.process_overwrite(&mut dst, Some(&src));
/// ```
#[derive(Debug, Clone)]
pub struct SpectralTilt {
    order: usize,
    slope_unit: SlopeUnit,
    norm: Normalization,
    slope: f32,
    slope_npn: f32,
    lower_frequency: f32,
    upper_frequency: f32,
    sample_rate: f32,
    bypass: bool,
    dirty: bool,
    truncated: bool,
    chain: SosChain,
}

impl Default for SpectralTilt {
    fn default() -> Self {
        Self::new()
    }
}

impl SpectralTilt {
    /// Create a filter with default settings: order 1, slope 0.5
    /// neper-per-neper, automatic normalization, band 0.1 Hz – 20 kHz,
    /// no sample rate.
    pub fn new() -> Self {
        Self::with_capacity(MAX_ORDER)
    }

    /// Create a filter whose cascade engine holds at most `max_sections`
    /// sections. Designs needing more sections are committed truncated
    /// (see [`truncated`](Self::truncated)).
    pub fn with_capacity(max_sections: usize) -> Self {
        Self {
            order: 1,
            slope_unit: SlopeUnit::NeperPerNeper,
            norm: Normalization::Auto,
            slope: 0.5,
            slope_npn: 0.5,
            lower_frequency: DFL_LOWER_FREQUENCY,
            upper_frequency: DFL_UPPER_FREQUENCY,
            sample_rate: -1.0,
            bypass: false,
            dirty: true,
            truncated: false,
            chain: SosChain::new(max_sections),
        }
    }

    // ─── Setters (each marks the design stale) ─────────────────────────

    /// Set the target number of first-order sections, clamped to [1, 100].
    ///
    /// The effective order is forced even before use, so odd values design
    /// one section more than requested.
    pub fn set_order(&mut self, order: usize) -> &mut Self {
        self.order = order.clamp(1, MAX_ORDER);
        self.dirty = true;
        self
    }

    /// Set the slope value, expressed in the current slope unit.
    pub fn set_slope(&mut self, slope: f32) -> &mut Self {
        self.slope = slope;
        self.dirty = true;
        self
    }

    /// Set the unit in which the slope value is expressed.
    pub fn set_slope_unit(&mut self, unit: SlopeUnit) -> &mut Self {
        self.slope_unit = unit;
        self.dirty = true;
        self
    }

    /// Set the gain normalization mode.
    pub fn set_norm(&mut self, norm: Normalization) -> &mut Self {
        self.norm = norm;
        self.dirty = true;
        self
    }

    /// Set the lower band frequency in Hz.
    pub fn set_lower_frequency(&mut self, freq: f32) -> &mut Self {
        self.lower_frequency = freq;
        self.dirty = true;
        self
    }

    /// Set the upper band frequency in Hz.
    pub fn set_upper_frequency(&mut self, freq: f32) -> &mut Self {
        self.upper_frequency = freq;
        self.dirty = true;
        self
    }

    /// Set the sample rate in Hz.
    pub fn set_sample_rate(&mut self, sr: f32) -> &mut Self {
        self.sample_rate = sr;
        self.dirty = true;
        self
    }

    // ─── Introspection ─────────────────────────────────────────────────

    /// Target order (normalized to the effective value by the last design
    /// pass).
    pub fn order(&self) -> usize {
        self.order
    }

    /// Slope value in the configured unit.
    pub fn slope(&self) -> f32 {
        self.slope
    }

    /// Slope converted to neper-per-neper by the last design pass.
    pub fn slope_npn(&self) -> f32 {
        self.slope_npn
    }

    /// Configured slope unit.
    pub fn slope_unit(&self) -> SlopeUnit {
        self.slope_unit
    }

    /// Configured normalization mode (`Auto` is kept as configured; it is
    /// resolved per design pass).
    pub fn norm(&self) -> Normalization {
        self.norm
    }

    /// Lower band frequency in Hz.
    pub fn lower_frequency(&self) -> f32 {
        self.lower_frequency
    }

    /// Upper band frequency in Hz.
    pub fn upper_frequency(&self) -> f32 {
        self.upper_frequency
    }

    /// Sample rate in Hz, -1.0 until set.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// True when the filter is a no-op (unit `None` or zero slope).
    pub fn bypass(&self) -> bool {
        self.bypass
    }

    /// True when the committed cascade is stale relative to the
    /// parameters.
    pub fn needs_update(&self) -> bool {
        self.dirty
    }

    /// True when the last design pass ran out of cascade capacity and
    /// committed a partial design.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Committed digital sections, in cascade order.
    pub fn sections(&self) -> &[tilt_dsp_lib::types::DigitalSos] {
        self.chain.sections()
    }

    /// Frequency response of the committed design at `freq` Hz.
    ///
    /// Returns `(magnitude, phase)`; a bypassed design reports unity.
    pub fn freq_response(&self, freq: f32) -> (f32, f32) {
        if self.bypass {
            (1.0, 0.0)
        } else {
            self.chain.freq_response(freq, self.sample_rate)
        }
    }

    /// Reset the cascade's delay memory (clear filter state).
    pub fn clear(&mut self) {
        self.chain.reset();
    }

    // ─── Designer ──────────────────────────────────────────────────────

    /// Recompute and commit the cascade if the parameters changed.
    ///
    /// No-op when the design is current. On success the design is marked
    /// clean — including the bypass outcome, which commits no cascade.
    pub fn update_settings(&mut self) {
        if !self.dirty {
            return;
        }

        // Force even order so every committed stage is a full biquad.
        if self.order % 2 != 0 {
            self.order += 1;
        }
        self.order = self.order.min(MAX_ORDER);

        self.slope_npn = match self.slope_unit {
            SlopeUnit::DbPerOctave => self.slope * DB_PER_OCTAVE_TO_NPN,
            SlopeUnit::DbPerDecade => self.slope * DB_PER_DECADE_TO_NPN,
            _ => self.slope,
        };

        // Resolve Auto for this pass without overwriting the setting.
        let norm = match self.norm {
            Normalization::Auto => {
                if self.slope_npn <= 0.0 {
                    Normalization::AtDc
                } else {
                    Normalization::AtNyquist
                }
            }
            other => other,
        };

        let nyquist = 0.5 * self.sample_rate;
        if self.lower_frequency >= nyquist {
            self.lower_frequency = DFL_LOWER_FREQUENCY;
        }
        if self.upper_frequency >= nyquist {
            self.upper_frequency = DFL_UPPER_FREQUENCY;
        }
        if self.lower_frequency >= self.upper_frequency {
            self.lower_frequency = DFL_LOWER_FREQUENCY;
            self.upper_frequency = DFL_UPPER_FREQUENCY;
        }

        if self.slope_unit == SlopeUnit::None || self.slope_npn == 0.0 {
            self.bypass = true;
            self.dirty = false;
            return;
        }
        self.bypass = false;

        let l_angf = 2.0 * PI * self.lower_frequency;
        let u_angf = 2.0 * PI * self.upper_frequency;

        // Exponential spacing ratio for the pole series; order is >= 2
        // here, so the exponent is well-defined.
        let ratio = (u_angf / l_angf).powf(1.0 / (self.order - 1) as f32);
        let kf = bilinear_coefficient(1.0, self.sample_rate);

        let mut neg_zero = l_angf * ratio.powf(-self.slope_npn);
        let mut neg_pole = l_angf;

        // Pair consecutive first-order sections into analog biquads and
        // commit their digital counterparts.
        self.truncated = false;
        self.chain.begin();
        for _ in 0..self.order / 2 {
            let lo = self.first_order_section(neg_zero, neg_pole, norm);
            neg_zero *= ratio;
            neg_pole *= ratio;

            let hi = self.first_order_section(neg_zero, neg_pole, norm);
            neg_zero *= ratio;
            neg_pole *= ratio;

            let analog = AnalogSos {
                t: [
                    lo.b0 * hi.b0,
                    lo.b0 * hi.b1 + lo.b1 * hi.b0,
                    lo.b1 * hi.b1,
                ],
                b: [
                    lo.a0 * hi.a0,
                    lo.a0 * hi.a1 + lo.a1 * hi.a0,
                    lo.a1 * hi.a1,
                ],
            };

            let Some(section) = self.chain.add_section() else {
                // Out of capacity: keep what was staged so far.
                self.truncated = true;
                break;
            };
            *section = bilinear_transform(&analog, kf);
        }
        self.chain.end(true);

        self.dirty = false;
    }

    /// Build one gain-normalized first-order analog section from the
    /// exponentially spaced series: `H(s) = (s + neg_zero) / (s + neg_pole)`.
    fn first_order_section(
        &self,
        neg_zero: f32,
        neg_pole: f32,
        norm: Normalization,
    ) -> BilinearSpec {
        let mut spec = BilinearSpec {
            b0: neg_zero,
            b1: 1.0,
            a0: neg_pole,
            a1: 1.0,
        };

        let gain = match norm {
            Normalization::None => 1.0,
            Normalization::AtNyquist => {
                // Reciprocal of |H(j*pi*fs)|, in closed form.
                let pi_fs = PI * self.sample_rate;
                let pi_fs_sq = pi_fs * pi_fs;
                let den = pi_fs_sq * spec.a1 * spec.a1 + spec.a0 * spec.a0;
                let re = (pi_fs_sq * spec.b1 * spec.a1 + spec.a0 * spec.b0) / den;
                let im = pi_fs * (spec.b1 * spec.a0 - spec.a1 * spec.b0) / den;
                1.0 / (re * re + im * im).sqrt()
            }
            // AtDc; Auto is resolved before this point.
            _ => spec.a0 / spec.b0,
        };

        spec.b0 *= gain;
        spec.b1 *= gain;
        spec
    }

    // ─── Streaming processor ───────────────────────────────────────────

    /// Additive mode: `dst[i] += filtered(src)[i]`.
    ///
    /// A `None` source is an all-zero input, so nothing changes. In
    /// bypass the source is accumulated unfiltered.
    pub fn process_add(&mut self, dst: &mut [f32], src: Option<&[f32]>) {
        let Some(src) = src else {
            // dst[i] + 0 = dst[i]
            return;
        };
        if self.bypass {
            pmath::add2(dst, src);
            return;
        }

        let count = dst.len().min(src.len());
        let mut temp = [0.0_f32; BUF_LIM_SIZE];
        let mut offset = 0;
        while offset < count {
            let to_do = (count - offset).min(BUF_LIM_SIZE);
            self.chain
                .process(&mut temp[..to_do], &src[offset..offset + to_do]);
            pmath::add2(&mut dst[offset..offset + to_do], &temp[..to_do]);
            offset += to_do;
        }
    }

    /// Multiplicative mode: `dst[i] *= filtered(src)[i]`.
    ///
    /// A `None` source is an all-zero input: `dst` is zero-filled.
    pub fn process_mul(&mut self, dst: &mut [f32], src: Option<&[f32]>) {
        let Some(src) = src else {
            // dst[i] * 0 = 0
            copy::fill_zero(dst);
            return;
        };
        if self.bypass {
            pmath::mul2(dst, src);
            return;
        }

        let count = dst.len().min(src.len());
        let mut temp = [0.0_f32; BUF_LIM_SIZE];
        let mut offset = 0;
        while offset < count {
            let to_do = (count - offset).min(BUF_LIM_SIZE);
            self.chain
                .process(&mut temp[..to_do], &src[offset..offset + to_do]);
            pmath::mul2(&mut dst[offset..offset + to_do], &temp[..to_do]);
            offset += to_do;
        }
    }

    /// Overwrite mode: `dst[i] = filtered(src)[i]`.
    ///
    /// A `None` source zero-fills `dst`; in bypass the source is copied.
    pub fn process_overwrite(&mut self, dst: &mut [f32], src: Option<&[f32]>) {
        match src {
            None => copy::fill_zero(dst),
            Some(src) => {
                let n = dst.len().min(src.len());
                if self.bypass {
                    copy::copy(&mut dst[..n], &src[..n]);
                } else {
                    self.chain.process(&mut dst[..n], &src[..n]);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    const SR: f32 = 48000.0;

    fn configured(order: usize, slope: f32, unit: SlopeUnit) -> SpectralTilt {
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_order(order)
            .set_slope(slope)
            .set_slope_unit(unit);
        tilt.update_settings();
        tilt
    }

    fn mag_db(tilt: &SpectralTilt, freq: f32) -> f32 {
        let (mag, _) = tilt.freq_response(freq);
        20.0 * mag.log10()
    }

    #[test]
    fn defaults() {
        let tilt = SpectralTilt::new();
        assert_eq!(tilt.order(), 1);
        assert_eq!(tilt.slope(), 0.5);
        assert_eq!(tilt.slope_unit(), SlopeUnit::NeperPerNeper);
        assert_eq!(tilt.norm(), Normalization::Auto);
        assert_eq!(tilt.lower_frequency(), 0.1);
        assert_eq!(tilt.upper_frequency(), 20.0e3);
        assert_eq!(tilt.sample_rate(), -1.0);
        assert!(tilt.needs_update());
        assert!(!tilt.bypass());
    }

    #[test]
    fn bypass_when_unit_none() {
        let tilt = configured(8, 3.0, SlopeUnit::None);
        assert!(tilt.bypass());
        assert!(!tilt.needs_update());
        assert!(tilt.sections().is_empty());
    }

    #[test]
    fn bypass_when_slope_zero() {
        let tilt = configured(8, 0.0, SlopeUnit::DbPerOctave);
        assert!(tilt.bypass());
        assert!(!tilt.needs_update());
    }

    #[test]
    fn non_bypass_for_nonzero_slope() {
        let tilt = configured(8, 3.0, SlopeUnit::DbPerOctave);
        assert!(!tilt.bypass());
        assert_eq!(tilt.sections().len(), 4);
    }

    #[test]
    fn effective_order_forced_even() {
        let tilt = configured(7, 1.0, SlopeUnit::NeperPerNeper);
        assert_eq!(tilt.order(), 8);
        assert_eq!(tilt.sections().len(), 4);

        let tilt = configured(1, 1.0, SlopeUnit::NeperPerNeper);
        assert_eq!(tilt.order(), 2);
        assert_eq!(tilt.sections().len(), 1);
    }

    #[test]
    fn order_clamped_to_maximum() {
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_order(100_000)
            .set_slope(1.0)
            .set_slope_unit(SlopeUnit::NeperPerNeper);
        tilt.update_settings();
        assert_eq!(tilt.order(), 100);
        assert_eq!(tilt.sections().len(), 50);
        assert!(!tilt.truncated());
    }

    #[test]
    fn band_reset_on_lower_above_nyquist() {
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_order(8)
            .set_slope(1.0)
            .set_slope_unit(SlopeUnit::NeperPerNeper)
            .set_lower_frequency(30_000.0)
            .set_upper_frequency(10_000.0);
        tilt.update_settings();
        assert_eq!(tilt.lower_frequency(), 0.1);
        // Upper stays: 10 kHz is valid and above the reset lower bound.
        assert_eq!(tilt.upper_frequency(), 10_000.0);
    }

    #[test]
    fn band_reset_on_upper_above_nyquist() {
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_order(8)
            .set_slope(1.0)
            .set_slope_unit(SlopeUnit::NeperPerNeper)
            .set_lower_frequency(100.0)
            .set_upper_frequency(25_000.0);
        tilt.update_settings();
        assert_eq!(tilt.lower_frequency(), 100.0);
        assert_eq!(tilt.upper_frequency(), 20.0e3);
    }

    #[test]
    fn band_reset_on_misordered_bounds() {
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_order(8)
            .set_slope(1.0)
            .set_slope_unit(SlopeUnit::NeperPerNeper)
            .set_lower_frequency(5_000.0)
            .set_upper_frequency(1_000.0);
        tilt.update_settings();
        assert_eq!(tilt.lower_frequency(), 0.1);
        assert_eq!(tilt.upper_frequency(), 20.0e3);
    }

    #[test]
    fn slope_conversion_constants() {
        let tilt = configured(8, 6.0, SlopeUnit::DbPerOctave);
        assert_approx_eq!(f32, tilt.slope_npn(), 6.0 * 0.166_096_404, ulps = 2);

        let tilt = configured(8, 20.0, SlopeUnit::DbPerDecade);
        assert_approx_eq!(f32, tilt.slope_npn(), 1.0, ulps = 2);

        let tilt = configured(8, 0.75, SlopeUnit::NeperPerNeper);
        assert_approx_eq!(f32, tilt.slope_npn(), 0.75, ulps = 2);
    }

    #[test]
    fn dc_normalization_is_unity() {
        // Negative slope resolves Auto to AtDc; DC gain must be exactly
        // normalized (the bilinear transform preserves the s = 0 point).
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_order(24)
            .set_slope(-6.0)
            .set_slope_unit(SlopeUnit::DbPerOctave)
            .set_lower_frequency(20.0)
            .set_upper_frequency(20_000.0);
        tilt.update_settings();

        let (mag_dc, _) = tilt.freq_response(0.0);
        assert_approx_eq!(f32, mag_dc, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn nyquist_normalization_is_near_unity() {
        // Positive slope resolves Auto to AtNyquist. The anchor is the
        // analog response at pi*fs, while digital Nyquist maps to s = inf,
        // so a slope- and band-dependent residual of a couple of dB
        // remains for steep wideband designs.
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_order(24)
            .set_slope(6.0)
            .set_slope_unit(SlopeUnit::DbPerOctave)
            .set_lower_frequency(20.0)
            .set_upper_frequency(20_000.0);
        tilt.update_settings();

        let db = mag_db(&tilt, SR / 2.0);
        assert!(
            db.abs() < 3.0,
            "Nyquist gain should be near 0 dB, got {db:.2} dB"
        );
    }

    #[test]
    fn slope_approximation_mid_band() {
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_order(24)
            .set_slope(6.0)
            .set_slope_unit(SlopeUnit::DbPerOctave)
            .set_lower_frequency(20.0)
            .set_upper_frequency(20_000.0);
        tilt.update_settings();

        for (f_lo, f_hi) in [(500.0, 1000.0), (1000.0, 2000.0), (2000.0, 4000.0)] {
            let diff = mag_db(&tilt, f_hi) - mag_db(&tilt, f_lo);
            assert!(
                (diff - 6.0).abs() < 1.0,
                "slope {f_lo}->{f_hi} Hz should be ~6 dB, got {diff:.2} dB"
            );
        }
    }

    #[test]
    fn negative_slope_darkens() {
        let tilt = configured(16, -3.0, SlopeUnit::DbPerOctave);
        assert!(mag_db(&tilt, 100.0) > mag_db(&tilt, 10_000.0));
    }

    #[test]
    fn update_settings_is_idempotent() {
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_order(24)
            .set_slope(6.0)
            .set_slope_unit(SlopeUnit::DbPerOctave);
        tilt.update_settings();
        assert!(!tilt.needs_update());
        let first: Vec<_> = tilt.sections().to_vec();

        tilt.update_settings();
        assert!(!tilt.needs_update());
        assert_eq!(tilt.sections(), first.as_slice(), "bit-identical cascade");
    }

    #[test]
    fn processing_does_not_refresh_a_stale_design() {
        let mut tilt = configured(8, 3.0, SlopeUnit::DbPerOctave);

        let impulse = {
            let mut v = vec![0.0f32; 64];
            v[0] = 1.0;
            v
        };
        let mut ir_before = vec![0.0f32; 64];
        tilt.process_overwrite(&mut ir_before, Some(&impulse));

        // Mutate parameters but do not refresh: the old cascade stays in
        // effect and the state reports stale.
        tilt.set_slope_unit(SlopeUnit::None);
        assert!(tilt.needs_update());
        tilt.clear();
        let mut ir_after = vec![0.0f32; 64];
        tilt.process_overwrite(&mut ir_after, Some(&impulse));
        assert_eq!(ir_before, ir_after);

        // After the explicit refresh the filter is a bypass.
        tilt.update_settings();
        let mut out = vec![0.0f32; 64];
        tilt.process_overwrite(&mut out, Some(&impulse));
        assert_eq!(out, impulse);
    }

    #[test]
    fn add_with_null_src_is_noop() {
        let mut tilt = configured(8, 3.0, SlopeUnit::DbPerOctave);
        let mut dst = [1.0, -2.0, 3.5, 0.0];
        let expected = dst;
        tilt.process_add(&mut dst, None);
        assert_eq!(dst, expected);
    }

    #[test]
    fn mul_with_null_src_zero_fills() {
        let mut tilt = configured(8, 3.0, SlopeUnit::DbPerOctave);
        let mut dst = [1.0, -2.0, 3.5, 0.25];
        tilt.process_mul(&mut dst, None);
        assert_eq!(dst, [0.0; 4]);
    }

    #[test]
    fn overwrite_with_null_src_zero_fills() {
        let mut tilt = configured(8, 3.0, SlopeUnit::DbPerOctave);
        let mut dst = [1.0, -2.0, 3.5, 0.25];
        tilt.process_overwrite(&mut dst, None);
        assert_eq!(dst, [0.0; 4]);
    }

    #[test]
    fn bypass_modes_degrade_to_plain_ops() {
        let mut tilt = configured(8, 0.0, SlopeUnit::None);
        assert!(tilt.bypass());

        let src = [0.5, -0.25, 1.0, 0.0];

        let mut dst = [1.0, 1.0, 1.0, 1.0];
        tilt.process_add(&mut dst, Some(&src));
        assert_eq!(dst, [1.5, 0.75, 2.0, 1.0]);

        let mut dst = [2.0, 2.0, 2.0, 2.0];
        tilt.process_mul(&mut dst, Some(&src));
        assert_eq!(dst, [1.0, -0.5, 2.0, 0.0]);

        let mut dst = [9.0, 9.0, 9.0, 9.0];
        tilt.process_overwrite(&mut dst, Some(&src));
        assert_eq!(dst, src);
    }

    #[test]
    fn zero_count_is_noop() {
        let mut tilt = configured(8, 3.0, SlopeUnit::DbPerOctave);
        let src: [f32; 0] = [];
        let mut dst: [f32; 0] = [];
        tilt.process_add(&mut dst, Some(&src));
        tilt.process_mul(&mut dst, Some(&src));
        tilt.process_overwrite(&mut dst, Some(&src));
    }

    #[test]
    fn end_to_end_impulse_is_causal_and_stable() {
        // 48 kHz, order 24, +6 dB/oct over 20 Hz – 20 kHz, Auto -> Nyquist.
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_order(24)
            .set_slope(6.0)
            .set_slope_unit(SlopeUnit::DbPerOctave)
            .set_lower_frequency(20.0)
            .set_upper_frequency(20_000.0);
        tilt.update_settings();

        assert_eq!(tilt.sections().len(), 12);
        assert!(!tilt.truncated());

        // All digital poles inside the unit circle. Standard denominator
        // is z^2 - a1*z - a2 in the pre-negated convention.
        for c in tilt.sections() {
            let disc = c.a1 * c.a1 + 4.0 * c.a2;
            if disc >= 0.0 {
                let r = disc.sqrt();
                for z in [0.5 * (c.a1 + r), 0.5 * (c.a1 - r)] {
                    assert!(z.abs() < 1.0, "unstable pole {z}");
                }
            } else {
                assert!(-c.a2 < 1.0, "unstable complex pole pair");
            }
        }

        let mut impulse = vec![0.0f32; 2048];
        impulse[0] = 1.0;
        let mut ir = vec![0.0f32; 2048];
        tilt.process_overwrite(&mut ir, Some(&impulse));

        assert!(ir[0] != 0.0, "impulse response must be causal");
        assert!(ir.iter().all(|x| x.is_finite()));
        let head: f32 = ir[..64].iter().map(|x| x * x).sum();
        let tail: f32 = ir[1984..].iter().map(|x| x * x).sum();
        assert!(tail < head * 1e-3, "impulse response must decay");
    }

    #[test]
    fn chunking_does_not_alter_output() {
        // One 257-sample call must equal a 256-call plus a 1-call.
        let src: Vec<f32> = (0..257).map(|i| (i as f32 * 0.37).sin() * 0.6).collect();

        let mut whole = configured(16, 4.5, SlopeUnit::DbPerOctave);
        let mut split = whole.clone();

        let mut dst_whole = vec![0.5f32; 257];
        whole.process_add(&mut dst_whole, Some(&src));

        let mut dst_split = vec![0.5f32; 257];
        split.process_add(&mut dst_split[..256], Some(&src[..256]));
        split.process_add(&mut dst_split[256..], Some(&src[256..]));

        for i in 0..257 {
            assert_approx_eq!(f32, dst_whole[i], dst_split[i], ulps = 4);
        }
    }

    #[test]
    fn truncated_design_is_committed_partially() {
        let mut tilt = SpectralTilt::with_capacity(4);
        tilt.set_sample_rate(SR)
            .set_order(24)
            .set_slope(3.0)
            .set_slope_unit(SlopeUnit::DbPerOctave);
        tilt.update_settings();

        assert!(tilt.truncated());
        assert!(!tilt.needs_update(), "partial design still counts as done");
        assert_eq!(tilt.sections().len(), 4);

        // The partial cascade still processes.
        let src = [1.0, 0.0, 0.0, 0.0];
        let mut dst = [0.0; 4];
        tilt.process_overwrite(&mut dst, Some(&src));
        assert!(dst.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn explicit_normalization_modes() {
        let mut tilt = SpectralTilt::new();
        tilt.set_sample_rate(SR)
            .set_order(24)
            .set_slope(-6.0)
            .set_slope_unit(SlopeUnit::DbPerOctave)
            .set_norm(Normalization::AtNyquist)
            .set_lower_frequency(20.0)
            .set_upper_frequency(20_000.0);
        tilt.update_settings();

        // Unity anchored at Nyquist even though the slope is negative.
        let db = mag_db(&tilt, SR / 2.0);
        assert!(db.abs() < 3.0, "got {db:.2} dB at Nyquist");
        // DC then sits well above unity for a falling slope.
        assert!(mag_db(&tilt, 1.0) > 20.0);
    }
}
