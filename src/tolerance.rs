//! Symmetric matching window with an absolute and a relative component.
//!
//! The half-width at a position `p` is `absolute + relative * |p|`. Both
//! components share the unit of the positions they are applied to; use
//! [`ToleranceWindow::from_ppm`] when the relative part is given in parts per
//! million.

use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};

/// Absolute + relative tolerance window.
///
/// # Example
///
/// ```rust
/// use mzmerge::tolerance::ToleranceWindow;
///
/// let tol = ToleranceWindow::from_ppm(0.005, 15.0)?;
/// assert!(tol.matches(500.0, 500.01));
/// assert!(!tol.matches(500.0, 500.02));
/// # Ok::<(), mzmerge::MergeError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ToleranceParams", into = "ToleranceParams")]
pub struct ToleranceWindow {
    absolute: f64,
    relative: f64,
}

impl ToleranceWindow {
    /// Create a window from an absolute half-width and a raw relative factor.
    ///
    /// Fails with [`MergeError::InvalidConfig`] if either component is negative
    /// or not finite.
    pub fn new(absolute: f64, relative: f64) -> Result<Self> {
        if !absolute.is_finite() || absolute < 0.0 {
            return Err(MergeError::InvalidConfig(format!(
                "absolute tolerance must be a finite value >= 0, got {}",
                absolute
            )));
        }
        if !relative.is_finite() || relative < 0.0 {
            return Err(MergeError::InvalidConfig(format!(
                "relative tolerance must be a finite value >= 0, got {}",
                relative
            )));
        }
        Ok(Self { absolute, relative })
    }

    /// Create a window whose relative component is expressed in ppm
    pub fn from_ppm(absolute: f64, ppm: f64) -> Result<Self> {
        if !ppm.is_finite() || ppm < 0.0 {
            return Err(MergeError::InvalidConfig(format!(
                "ppm tolerance must be a finite value >= 0, got {}",
                ppm
            )));
        }
        Self::new(absolute, ppm / 1e6)
    }

    /// Purely absolute window
    pub fn absolute_only(absolute: f64) -> Result<Self> {
        Self::new(absolute, 0.0)
    }

    /// Window used for merging IMS-TOF MS1 scans (0.005 + 15 ppm)
    pub fn default_ms1_merge() -> Self {
        Self {
            absolute: 0.005,
            relative: 15.0 / 1e6,
        }
    }

    /// Window used for merging MS2 scans (0.008 + 25 ppm)
    pub fn default_ms2_merge() -> Self {
        Self {
            absolute: 0.008,
            relative: 25.0 / 1e6,
        }
    }

    /// Absolute component
    pub fn absolute(&self) -> f64 {
        self.absolute
    }

    /// Relative component as a raw factor
    pub fn relative(&self) -> f64 {
        self.relative
    }

    /// Relative component in ppm
    pub fn ppm(&self) -> f64 {
        self.relative * 1e6
    }

    /// Half-width of the window centred on `position`
    #[inline]
    pub fn half_width(&self, position: f64) -> f64 {
        self.absolute + self.relative * position.abs()
    }

    /// Closed range `(low, high)` around `position`
    #[inline]
    pub fn range(&self, position: f64) -> (f64, f64) {
        let hw = self.half_width(position);
        (position - hw, position + hw)
    }

    /// Whether two positions fall within tolerance of each other.
    ///
    /// The half-width is evaluated at the midpoint, so `matches(a, b)` and
    /// `matches(b, a)` always agree.
    #[inline]
    pub fn matches(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.half_width((a + b) / 2.0)
    }
}

impl Default for ToleranceWindow {
    fn default() -> Self {
        Self::default_ms1_merge()
    }
}

impl std::fmt::Display for ToleranceWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (abs) + {} ppm", self.absolute, self.ppm())
    }
}

/// Serialized shape of a tolerance window.
///
/// Exactly one of `relative` (raw factor) or `ppm` may be given; both default
/// to zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ToleranceParams {
    /// Absolute half-width
    #[serde(default)]
    pub absolute: f64,
    /// Relative factor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative: Option<f64>,
    /// Relative part in ppm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ppm: Option<f64>,
}

impl TryFrom<ToleranceParams> for ToleranceWindow {
    type Error = MergeError;

    fn try_from(params: ToleranceParams) -> Result<Self> {
        match (params.relative, params.ppm) {
            (Some(_), Some(_)) => Err(MergeError::InvalidConfig(
                "specify either `relative` or `ppm`, not both".to_string(),
            )),
            (Some(relative), None) => Self::new(params.absolute, relative),
            (None, Some(ppm)) => Self::from_ppm(params.absolute, ppm),
            (None, None) => Self::new(params.absolute, 0.0),
        }
    }
}

impl From<ToleranceWindow> for ToleranceParams {
    fn from(window: ToleranceWindow) -> Self {
        Self {
            absolute: window.absolute,
            relative: Some(window.relative),
            ppm: None,
        }
    }
}
