// SPDX-License-Identifier: LGPL-3.0-or-later

//! # tilt-dsp-units
//!
//! Spectral tilt filtering built on [`tilt_dsp_lib`]:
//!
//! - [`chain::SosChain`] — a cascaded second-order-section engine with a
//!   begin/add/commit build protocol and packed processing
//! - [`tilt::SpectralTilt`] — a filter approximating a power-law
//!   ("fractional-slope") magnitude response over a configurable band,
//!   applied to streaming audio in additive, multiplicative or overwrite
//!   mode
//!
//! All processing is single-threaded and allocation-free; parameter
//! changes are applied lazily through an explicit `update_settings` call.

pub mod chain;
pub mod tilt;
