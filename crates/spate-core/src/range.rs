//! Half-open 3-D cell index ranges.

use crate::error::RangeError;

/// A half-open cell range `[il, iu) × [jl, ju) × [kl, ku)`.
///
/// Used by the equation-of-state floor enforcer and the stage-update
/// kernels to bound in-place sweeps over a block's storage. An inverted
/// or empty range is a contract violation, reported through
/// [`validate()`](IndexRange::validate) — callers treat it as fatal,
/// never as a retryable condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexRange {
    /// Inclusive lower i bound.
    pub il: usize,
    /// Exclusive upper i bound.
    pub iu: usize,
    /// Inclusive lower j bound.
    pub jl: usize,
    /// Exclusive upper j bound.
    pub ju: usize,
    /// Inclusive lower k bound.
    pub kl: usize,
    /// Exclusive upper k bound.
    pub ku: usize,
}

impl IndexRange {
    /// Build a range from its six bounds.
    pub fn new(il: usize, iu: usize, jl: usize, ju: usize, kl: usize, ku: usize) -> Self {
        Self {
            il,
            iu,
            jl,
            ju,
            kl,
            ku,
        }
    }

    /// Check that every axis is non-empty and properly ordered.
    pub fn validate(&self) -> Result<(), RangeError> {
        if self.il >= self.iu || self.jl >= self.ju || self.kl >= self.ku {
            return Err(RangeError::InvalidRange { range: *self });
        }
        Ok(())
    }

    /// Number of cells covered by the range.
    pub fn cell_count(&self) -> usize {
        (self.iu - self.il) * (self.ju - self.jl) * (self.ku - self.kl)
    }

    /// Whether this range lies entirely within `(ni, nj, nk)` extents.
    pub fn fits(&self, ni: usize, nj: usize, nk: usize) -> bool {
        self.iu <= ni && self.ju <= nj && self.ku <= nk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn valid_range_passes() {
        let r = IndexRange::new(2, 10, 0, 4, 0, 4);
        assert!(r.validate().is_ok());
        assert_eq!(r.cell_count(), 8 * 4 * 4);
    }

    #[test]
    fn inverted_range_rejected() {
        let r = IndexRange::new(10, 2, 0, 4, 0, 4);
        assert!(matches!(
            r.validate(),
            Err(RangeError::InvalidRange { .. })
        ));
    }

    #[test]
    fn empty_axis_rejected() {
        let r = IndexRange::new(0, 4, 3, 3, 0, 4);
        assert!(r.validate().is_err());
    }

    #[test]
    fn fits_checks_every_axis() {
        let r = IndexRange::new(0, 8, 0, 4, 0, 4);
        assert!(r.fits(8, 4, 4));
        assert!(!r.fits(7, 4, 4));
        assert!(!r.fits(8, 3, 4));
        assert!(!r.fits(8, 4, 3));
    }

    proptest! {
        #[test]
        fn validated_range_has_positive_count(
            il in 0usize..16, di in 1usize..16,
            jl in 0usize..16, dj in 1usize..16,
            kl in 0usize..16, dk in 1usize..16,
        ) {
            let r = IndexRange::new(il, il + di, jl, jl + dj, kl, kl + dk);
            prop_assert!(r.validate().is_ok());
            prop_assert!(r.cell_count() > 0);
            prop_assert_eq!(r.cell_count(), di * dj * dk);
        }
    }
}
