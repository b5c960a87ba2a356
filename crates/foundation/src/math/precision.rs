//! Total ordering for `f64` keys.

use core::cmp::Ordering;

/// An `f64` usable as a sort or tie-break key.
///
/// `-0.0` and `0.0` compare equal, every NaN compares equal to every other NaN
/// and sorts above `+inf`.
#[derive(Debug, Copy, Clone)]
pub struct TotalF64(pub f64);

impl TotalF64 {
    fn key(self) -> f64 {
        match self.0 {
            v if v == 0.0 => 0.0,
            v if v.is_nan() => f64::NAN,
            v => v,
        }
    }
}

impl PartialEq for TotalF64 {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

impl Eq for TotalF64 {}

impl PartialOrd for TotalF64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TotalF64 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().total_cmp(&other.key())
    }
}

#[cfg(test)]
mod tests {
    use super::TotalF64;

    #[test]
    fn signed_zeros_and_nans_collapse() {
        assert_eq!(TotalF64(-0.0), TotalF64(0.0));
        assert_eq!(TotalF64(f64::NAN), TotalF64(-f64::NAN));
        assert!(TotalF64(f64::INFINITY) < TotalF64(f64::NAN));
    }

    #[test]
    fn sorts_with_tuple_tie_break() {
        let mut hits = vec![(TotalF64(2.0), 1u32), (TotalF64(1.0), 9), (TotalF64(1.0), 4)];
        hits.sort();
        let keys: Vec<u32> = hits.into_iter().map(|(_, k)| k).collect();
        assert_eq!(keys, vec![4, 9, 1]);
    }
}
