// SPDX-License-Identifier: LGPL-3.0-or-later

//! Cascaded second-order-section engine.
//!
//! A [`SosChain`] is built through a begin/add/commit protocol: `begin`
//! starts a new cascade definition (invalidating the previous one),
//! `add_section` hands out the next coefficient slot until capacity is
//! exhausted, and `end` commits the pending sections. With `pack = true`
//! the committed sections are grouped into x8/x4/x2/x1 stages so that,
//! for example, 11 sections process as one x8 + one x2 + one x1 stage.
//!
//! All storage is reserved at construction; the build protocol and the
//! processing path never allocate.

use tilt_dsp_lib::copy;
use tilt_dsp_lib::sos::{sos_process, sos_process_inplace};
use tilt_dsp_lib::types::{DigitalSos, PackedCoeffs, SosGroup, SosStage};

/// A cascade of digital second-order sections with packed processing.
///
/// # Examples
///
/// ```
/// use tilt_dsp_units::chain::SosChain;
///
/// let mut chain = SosChain::new(4);
/// chain.begin();
/// if let Some(section) = chain.add_section() {
///     section.b0 = 1.0; // identity
/// }
/// chain.end(true);
///
/// let src = [1.0, 0.5, -0.25, 0.0];
/// let mut dst = [0.0; 4];
/// chain.process(&mut dst, &src);
/// assert_eq!(dst, src);
/// ```
#[derive(Debug, Clone)]
pub struct SosChain {
    /// Sections in commit order (the uncommitted build target before `end`).
    staged: Vec<DigitalSos>,
    /// Committed sections, for introspection and response evaluation.
    committed: Vec<DigitalSos>,
    /// Committed packed stages with delay memory.
    stages: Vec<SosStage>,
    capacity: usize,
}

impl SosChain {
    /// Create a chain able to hold up to `max_sections` sections.
    ///
    /// This is the only allocation point; the build protocol and the
    /// processing path reuse the reserved storage.
    pub fn new(max_sections: usize) -> Self {
        Self {
            staged: Vec::with_capacity(max_sections),
            committed: Vec::with_capacity(max_sections),
            stages: Vec::with_capacity(max_sections),
            capacity: max_sections,
        }
    }

    /// Maximum number of sections this chain can hold.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of committed sections.
    pub fn len(&self) -> usize {
        self.committed.len()
    }

    /// Return true if no sections are committed.
    pub fn is_empty(&self) -> bool {
        self.committed.is_empty()
    }

    /// Committed section coefficients, in commit order.
    pub fn sections(&self) -> &[DigitalSos] {
        &self.committed
    }

    /// Start a new cascade definition.
    ///
    /// The previous cascade is invalidated: until [`end`](Self::end)
    /// commits, the chain processes as passthrough.
    pub fn begin(&mut self) {
        self.staged.clear();
        self.committed.clear();
        self.stages.clear();
    }

    /// Reserve the next section slot.
    ///
    /// Returns `None` when capacity is exhausted. The slot is initialized
    /// to all-zero coefficients; the caller writes the real ones.
    pub fn add_section(&mut self) -> Option<&mut DigitalSos> {
        if self.staged.len() >= self.capacity {
            return None;
        }
        self.staged.push(DigitalSos::default());
        self.staged.last_mut()
    }

    /// Commit the pending cascade.
    ///
    /// With `pack`, sections are greedily grouped into x8/x4/x2/x1 stages;
    /// otherwise every section becomes its own x1 stage. Delay memory is
    /// zeroed on commit.
    pub fn end(&mut self, pack: bool) {
        self.committed.clear();
        self.committed.extend_from_slice(&self.staged);
        self.stages.clear();

        let mut rest = self.committed.as_slice();
        if pack {
            while rest.len() >= 8 {
                self.stages
                    .push(SosStage::new(PackedCoeffs::X8(group::<8>(&rest[..8]))));
                rest = &rest[8..];
            }
            if rest.len() >= 4 {
                self.stages
                    .push(SosStage::new(PackedCoeffs::X4(group::<4>(&rest[..4]))));
                rest = &rest[4..];
            }
            if rest.len() >= 2 {
                self.stages
                    .push(SosStage::new(PackedCoeffs::X2(group::<2>(&rest[..2]))));
                rest = &rest[2..];
            }
            if !rest.is_empty() {
                self.stages
                    .push(SosStage::new(PackedCoeffs::X1(group::<1>(&rest[..1]))));
            }
        } else {
            for c in rest {
                let mut g: SosGroup<1> = SosGroup::default();
                g.set_lane(0, c);
                self.stages.push(SosStage::new(PackedCoeffs::X1(g)));
            }
        }
    }

    /// Zero all delay memory without touching coefficients.
    pub fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.reset();
        }
    }

    /// Run the committed cascade: `src -> dst`.
    ///
    /// Processes `min(dst.len(), src.len())` samples. An empty chain is
    /// passthrough.
    pub fn process(&mut self, dst: &mut [f32], src: &[f32]) {
        let n = dst.len().min(src.len());
        if n == 0 {
            return;
        }

        let mut iter = self.stages.iter_mut();
        match iter.next() {
            None => copy::copy(&mut dst[..n], &src[..n]),
            Some(first) => {
                sos_process(&mut dst[..n], &src[..n], first);
                for stage in iter {
                    sos_process_inplace(&mut dst[..n], stage);
                }
            }
        }
    }

    /// Run the committed cascade in place.
    pub fn process_inplace(&mut self, buf: &mut [f32]) {
        for stage in &mut self.stages {
            sos_process_inplace(buf, stage);
        }
    }

    /// Combined frequency response of the committed cascade at `freq` Hz.
    ///
    /// Returns `(magnitude, phase)`, magnitude linear, phase in radians.
    /// An empty chain reports unity.
    pub fn freq_response(&self, freq: f32, sample_rate: f32) -> (f32, f32) {
        let w = 2.0 * std::f32::consts::PI * freq / sample_rate;
        let (cos_w, sin_w) = (w.cos(), w.sin());
        let (cos_2w, sin_2w) = ((2.0 * w).cos(), (2.0 * w).sin());

        let mut mag = 1.0_f32;
        let mut phase = 0.0_f32;
        for c in &self.committed {
            // Pre-negated convention: H(z) = (b0 + b1 z^-1 + b2 z^-2)
            //                                / (1 - a1 z^-1 - a2 z^-2)
            let num_re = c.b0 + c.b1 * cos_w + c.b2 * cos_2w;
            let num_im = -c.b1 * sin_w - c.b2 * sin_2w;
            let den_re = 1.0 - c.a1 * cos_w - c.a2 * cos_2w;
            let den_im = c.a1 * sin_w + c.a2 * sin_2w;

            let den_sq = den_re * den_re + den_im * den_im;
            mag *= ((num_re * num_re + num_im * num_im) / den_sq).sqrt();
            phase += num_im.atan2(num_re) - den_im.atan2(den_re);
        }
        (mag, phase)
    }
}

fn group<const N: usize>(sections: &[DigitalSos]) -> SosGroup<N> {
    let mut g = SosGroup::default();
    for (lane, c) in sections.iter().enumerate() {
        g.set_lane(lane, c);
    }
    g
}
