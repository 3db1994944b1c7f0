// SPDX-License-Identifier: LGPL-3.0-or-later

//! # tilt-dsp-lib
//!
//! Low-level DSP primitives for cascaded second-order-section (SOS)
//! filtering:
//!
//! - **Types**: digital/analog SOS coefficients and packed cascade stages
//! - **Kernels**: x1/x2/x4/x8 packed cascade processing
//! - **Transform**: bilinear analog → digital mapping with pre-warping
//! - **Buffer ops**: elementwise accumulate/multiply, copy, zero-fill
//!
//! ## Coefficient convention
//!
//! Digital denominator coefficients are stored **pre-negated** relative to
//! the textbook transfer function, so the filter recurrence uses addition
//! throughout (see [`types::DigitalSos`]). Higher layers that build
//! cascades must preserve this convention bit-for-bit.
//!
//! ## Design
//!
//! Buffer-to-buffer operations use runtime SIMD dispatch via the
//! `multiversion` crate. The recursive SOS kernels are scalar: the
//! per-sample feedback dependency does not vectorize across time.

pub mod copy;
pub mod pmath;
pub mod sos;
pub mod transform;
pub mod types;
