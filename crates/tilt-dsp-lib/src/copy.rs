// SPDX-License-Identifier: LGPL-3.0-or-later

//! Buffer copy and fill operations.

/// Copy `src` into `dst`.
///
/// # Panics
/// Panics if `dst.len() < src.len()`.
pub fn copy(dst: &mut [f32], src: &[f32]) {
    assert!(dst.len() >= src.len(), "dst too small");
    dst[..src.len()].copy_from_slice(src);
}

/// Fill `dst` with zeros.
pub fn fill_zero(dst: &mut [f32]) {
    dst.fill(0.0);
}
