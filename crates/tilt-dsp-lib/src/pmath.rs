// SPDX-License-Identifier: LGPL-3.0-or-later

//! Packed (buffer-to-buffer) math operations.
//!
//! Two-operand accumulate forms: the destination is both input and output.

use multiversion::multiversion;

/// Element-wise accumulate: `dst[i] += src[i]`.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn add2(dst: &mut [f32], src: &[f32]) {
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d += s;
    }
}

/// Element-wise multiply-accumulate into place: `dst[i] *= src[i]`.
#[multiversion(targets("x86_64+avx2+fma", "x86_64+avx", "x86_64+sse4.1", "aarch64+neon",))]
pub fn mul2(dst: &mut [f32], src: &[f32]) {
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d *= s;
    }
}
