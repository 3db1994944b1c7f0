// SPDX-License-Identifier: LGPL-3.0-or-later

//! Packed second-order-section cascade kernels.
//!
//! One generic per-sample kernel serves all packing widths; the stage's
//! lanes are chained in order, so an X8 stage evaluates eight cascaded
//! sections per sample. Coefficients follow the pre-negated denominator
//! convention described in [`crate::types::DigitalSos`].

use crate::types::{PackedCoeffs, SosGroup, SosStage, SOS_D_ITEMS};

/// Advance one sample through all lanes of a packed stage.
#[inline(always)]
fn tick<const N: usize>(c: &SosGroup<N>, d: &mut [f32; SOS_D_ITEMS], x: f32) -> f32 {
    let mut s = x;
    for j in 0..N {
        let di = j * 2;
        let s2 = c.b0[j] * s + d[di];
        let p1 = c.b1[j] * s + c.a1[j] * s2;
        let p2 = c.b2[j] * s + c.a2[j] * s2;
        d[di] = d[di + 1] + p1;
        d[di + 1] = p2;
        s = s2;
    }
    s
}

#[inline]
fn run<const N: usize>(c: &SosGroup<N>, d: &mut [f32; SOS_D_ITEMS], dst: &mut [f32], src: &[f32]) {
    for (out, &inp) in dst.iter_mut().zip(src.iter()) {
        *out = tick(c, d, inp);
    }
}

#[inline]
fn run_inplace<const N: usize>(c: &SosGroup<N>, d: &mut [f32; SOS_D_ITEMS], buf: &mut [f32]) {
    for s in buf.iter_mut() {
        *s = tick(c, d, *s);
    }
}

/// Process `src` into `dst` through one packed stage.
///
/// Processes `min(dst.len(), src.len())` samples.
pub fn sos_process(dst: &mut [f32], src: &[f32], stage: &mut SosStage) {
    let d = &mut stage.d;
    match &stage.coeffs {
        PackedCoeffs::X1(c) => run(c, d, dst, src),
        PackedCoeffs::X2(c) => run(c, d, dst, src),
        PackedCoeffs::X4(c) => run(c, d, dst, src),
        PackedCoeffs::X8(c) => run(c, d, dst, src),
    }
}

/// Process `buf` in place through one packed stage.
///
/// Each sample is read before it is written, so no scratch buffer is
/// needed; this is what keeps multi-stage cascades allocation-free.
pub fn sos_process_inplace(buf: &mut [f32], stage: &mut SosStage) {
    let d = &mut stage.d;
    match &stage.coeffs {
        PackedCoeffs::X1(c) => run_inplace(c, d, buf),
        PackedCoeffs::X2(c) => run_inplace(c, d, buf),
        PackedCoeffs::X4(c) => run_inplace(c, d, buf),
        PackedCoeffs::X8(c) => run_inplace(c, d, buf),
    }
}
