// SPDX-License-Identifier: LGPL-3.0-or-later

//! Bilinear transform: analog prototype sections to digital sections.

use crate::types::{AnalogSos, DigitalSos};

/// Coefficient for the bilinear warping equation.
///
/// `bilinear_coefficient(w, fs) = w / tan(0.5 * w / fs)`. When the result
/// is used as the substitution constant in [`bilinear_transform`], the
/// analog frequency `w` (rad/s) lands exactly on its digital counterpart.
/// Evaluated at unit angular frequency this is the standard constant
/// (≈ `2 * fs`) mapping rad/s-designed prototypes into the digital domain.
pub fn bilinear_coefficient(angular_frequency: f32, sample_rate: f32) -> f32 {
    angular_frequency / (0.5 * angular_frequency / sample_rate).tan()
}

/// Transform an analog second-order prototype into a digital section.
///
/// Applies `s <- kf * (1 - z^-1) / (1 + z^-1)` and normalizes by the
/// digital denominator's constant term. The returned denominator
/// coefficients are **pre-negated** per the convention in
/// [`DigitalSos`]; consumers must not flip them back.
pub fn bilinear_transform(spec: &AnalogSos, kf: f32) -> DigitalSos {
    let kf2 = kf * kf;

    // Numerator and denominator of H(z), powers of z^-1, unnormalized.
    let t0 = spec.t[0] + spec.t[1] * kf + spec.t[2] * kf2;
    let t1 = 2.0 * (spec.t[0] - spec.t[2] * kf2);
    let t2 = spec.t[0] - spec.t[1] * kf + spec.t[2] * kf2;

    let b0 = spec.b[0] + spec.b[1] * kf + spec.b[2] * kf2;
    let b1 = 2.0 * (spec.b[0] - spec.b[2] * kf2);
    let b2 = spec.b[0] - spec.b[1] * kf + spec.b[2] * kf2;

    let norm = 1.0 / b0;
    DigitalSos {
        b0: t0 * norm,
        b1: t1 * norm,
        b2: t2 * norm,
        a1: -b1 * norm,
        a2: -b2 * norm,
    }
}
