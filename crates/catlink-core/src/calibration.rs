//! Piecewise-linear meter calibration.
//!
//! Rigs report meters (S-meter, SWR, ALC, power, compression, drain
//! voltage and current) as raw device units, typically 0-255. Each model
//! publishes a handful of breakpoints mapping raw readings to physical
//! units; values in between are interpolated linearly and values outside
//! the table are clamped to the nearest end.

use crate::error::{Error, Result};

/// One `(raw, value)` breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationPoint {
    pub raw: i32,
    pub value: f32,
}

impl CalibrationPoint {
    pub const fn new(raw: i32, value: f32) -> Self {
        CalibrationPoint { raw, value }
    }
}

/// An ordered list of breakpoints, strictly increasing in `raw`.
///
/// Tables are declared as `const` data next to the model they belong to;
/// [`validate`](Self::validate) checks the ordering invariant and is run
/// when the model registry is built.
///
/// ```
/// use catlink_core::calibration::{CalibrationPoint, CalibrationTable};
///
/// const SWR: CalibrationTable = CalibrationTable::new(&[
///     CalibrationPoint::new(0, 1.0),
///     CalibrationPoint::new(48, 1.5),
///     CalibrationPoint::new(80, 2.0),
/// ]);
/// assert_eq!(SWR.interpolate(48), 1.5);
/// assert_eq!(SWR.interpolate(64), 1.75);
/// assert_eq!(SWR.interpolate(200), 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationTable {
    points: &'static [CalibrationPoint],
}

impl CalibrationTable {
    pub const fn new(points: &'static [CalibrationPoint]) -> Self {
        CalibrationTable { points }
    }

    pub fn points(&self) -> &'static [CalibrationPoint] {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Check that the table is non-empty and strictly increasing in `raw`.
    pub fn validate(&self) -> Result<()> {
        if self.points.is_empty() {
            return Err(Error::InvalidParameter("calibration table is empty".into()));
        }
        if let Some(pair) = self.points.windows(2).find(|w| w[0].raw >= w[1].raw) {
            return Err(Error::InvalidParameter(format!(
                "calibration raw values not strictly increasing at {} -> {}",
                pair[0].raw, pair[1].raw
            )));
        }
        Ok(())
    }

    /// Convert a raw reading to physical units.
    ///
    /// A reading at a breakpoint returns that breakpoint's value exactly.
    /// Readings below the first or above the last breakpoint are clamped.
    /// An empty table passes the raw value through.
    pub fn interpolate(&self, raw: i32) -> f32 {
        let (first, last) = match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return raw as f32,
        };
        if raw <= first.raw {
            return first.value;
        }
        if raw >= last.raw {
            return last.value;
        }

        // First breakpoint strictly above the reading; the clamps above
        // guarantee it exists and is not the first one.
        let upper = self.points.partition_point(|p| p.raw <= raw);
        let hi = self.points[upper];
        let lo = self.points[upper - 1];
        if raw == lo.raw {
            return lo.value;
        }

        let span = (hi.raw - lo.raw) as f32;
        let offset = (hi.raw - raw) as f32;
        hi.value - offset * (hi.value - lo.value) / span
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STR: CalibrationTable = CalibrationTable::new(&[
        CalibrationPoint::new(0, -54.0),
        CalibrationPoint::new(120, 0.0),
        CalibrationPoint::new(241, 60.0),
    ]);

    const RFPOWER: CalibrationTable = CalibrationTable::new(&[
        CalibrationPoint::new(0, 0.0),
        CalibrationPoint::new(21, 5.0),
        CalibrationPoint::new(43, 10.0),
        CalibrationPoint::new(213, 100.0),
        CalibrationPoint::new(255, 120.0),
    ]);

    #[test]
    fn exact_at_every_breakpoint() {
        for table in [STR, RFPOWER] {
            for p in table.points() {
                assert_eq!(table.interpolate(p.raw), p.value, "raw {}", p.raw);
            }
        }
    }

    #[test]
    fn clamps_outside_range() {
        assert_eq!(STR.interpolate(-10), -54.0);
        assert_eq!(STR.interpolate(255), 60.0);
        assert_eq!(RFPOWER.interpolate(1000), 120.0);
    }

    #[test]
    fn interpolates_between_breakpoints() {
        // Halfway between (0, -54) and (120, 0).
        assert!((STR.interpolate(60) - -27.0).abs() < 1e-4);
        // Between (21, 5) and (43, 10): 32 is exactly halfway.
        assert!((RFPOWER.interpolate(32) - 7.5).abs() < 1e-4);
    }

    #[test]
    fn single_point_table_is_constant() {
        const ONE: CalibrationTable = CalibrationTable::new(&[CalibrationPoint::new(10, 3.0)]);
        assert_eq!(ONE.interpolate(0), 3.0);
        assert_eq!(ONE.interpolate(10), 3.0);
        assert_eq!(ONE.interpolate(99), 3.0);
    }

    #[test]
    fn empty_table_passes_raw_through() {
        const EMPTY: CalibrationTable = CalibrationTable::new(&[]);
        assert_eq!(EMPTY.interpolate(42), 42.0);
        assert!(EMPTY.validate().is_err());
    }

    #[test]
    fn validate_rejects_unordered() {
        const BAD: CalibrationTable = CalibrationTable::new(&[
            CalibrationPoint::new(0, 0.0),
            CalibrationPoint::new(50, 1.0),
            CalibrationPoint::new(50, 2.0),
        ]);
        assert!(matches!(BAD.validate(), Err(Error::InvalidParameter(_))));
        assert!(STR.validate().is_ok());
    }
}
