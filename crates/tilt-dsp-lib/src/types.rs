// SPDX-License-Identifier: LGPL-3.0-or-later

//! Coefficient and state types for cascaded second-order sections.

/// Number of delay (memory) elements in one packed cascade stage.
///
/// Two delay slots per section, eight sections maximum per stage.
pub const SOS_D_ITEMS: usize = 16;

/// Coefficients of a single digital second-order section.
///
/// The denominator is normalized (`a0 = 1`, folded into the remaining
/// coefficients) and `a1`/`a2` are stored **pre-negated** compared to the
/// standard audio cookbook, so the recurrence uses addition:
/// ```text
///   y[n] = b0*x[n] + d0
///   d0   = b1*x[n] + a1*y[n] + d1
///   d1   = b2*x[n] + a2*y[n]
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct DigitalSos {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

/// Analog second-order prototype section.
///
/// Transfer function `H(s) = (t[0] + t[1]*s + t[2]*s^2) /
/// (b[0] + b[1]*s + b[2]*s^2)`; feed to
/// [`transform::bilinear_transform`](crate::transform::bilinear_transform)
/// to obtain the digital section.
#[derive(Debug, Clone, Copy, Default)]
#[repr(C)]
pub struct AnalogSos {
    /// Numerator polynomial coefficients, constant term first.
    pub t: [f32; 3],
    /// Denominator polynomial coefficients, constant term first.
    pub b: [f32; 3],
}

/// Coefficients for `N` sections evaluated as one packed cascade stage.
///
/// Lane `j` holds section `j` of the stage; sections are chained in lane
/// order (the output of lane `j` feeds lane `j + 1`).
#[derive(Debug, Clone, Copy)]
pub struct SosGroup<const N: usize> {
    pub b0: [f32; N],
    pub b1: [f32; N],
    pub b2: [f32; N],
    pub a1: [f32; N],
    pub a2: [f32; N],
}

impl<const N: usize> Default for SosGroup<N> {
    fn default() -> Self {
        Self {
            b0: [0.0; N],
            b1: [0.0; N],
            b2: [0.0; N],
            a1: [0.0; N],
            a2: [0.0; N],
        }
    }
}

impl<const N: usize> SosGroup<N> {
    /// Store one section's coefficients into lane `lane`.
    ///
    /// # Panics
    /// Panics if `lane >= N`.
    pub fn set_lane(&mut self, lane: usize, c: &DigitalSos) {
        self.b0[lane] = c.b0;
        self.b1[lane] = c.b1;
        self.b2[lane] = c.b2;
        self.a1[lane] = c.a1;
        self.a2[lane] = c.a2;
    }
}

/// Packed stage coefficients — one of the supported widths.
#[derive(Debug, Clone, Copy)]
pub enum PackedCoeffs {
    X1(SosGroup<1>),
    X2(SosGroup<2>),
    X4(SosGroup<4>),
    X8(SosGroup<8>),
}

/// One packed cascade stage: coefficients plus delay memory.
#[derive(Debug, Clone)]
pub struct SosStage {
    /// Delay memory, two elements per lane.
    pub d: [f32; SOS_D_ITEMS],
    /// Stage coefficients.
    pub coeffs: PackedCoeffs,
}

impl Default for SosStage {
    fn default() -> Self {
        Self {
            d: [0.0; SOS_D_ITEMS],
            coeffs: PackedCoeffs::X1(SosGroup::default()),
        }
    }
}

impl SosStage {
    /// Create a stage with the given coefficients and cleared delay memory.
    pub fn new(coeffs: PackedCoeffs) -> Self {
        Self {
            d: [0.0; SOS_D_ITEMS],
            coeffs,
        }
    }

    /// Zero the delay memory (clear filter state).
    pub fn reset(&mut self) {
        self.d = [0.0; SOS_D_ITEMS];
    }

    /// Number of sections held by this stage.
    pub fn width(&self) -> usize {
        match self.coeffs {
            PackedCoeffs::X1(_) => 1,
            PackedCoeffs::X2(_) => 2,
            PackedCoeffs::X4(_) => 4,
            PackedCoeffs::X8(_) => 8,
        }
    }
}
