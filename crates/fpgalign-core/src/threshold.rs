//! The minimizer-count threshold oracle.
//!
//! A query is a membership candidate for a bin only if the number of its
//! minimizer hashes found in that bin meets or exceeds `T(h)`, where `h` is
//! the number of distinct minimizer hashes the query produced.

/// Computes `T(h) = max(0, h - e*w)` and memoizes the last `(h, T(h))` pair,
/// since the driver calls this once per query per bin and `h` is constant
/// across bins for a given query.
#[derive(Debug, Clone)]
pub struct ThresholdOracle {
    errors: u8,
    window_size: u8,
    last: Option<(u32, u32)>,
}

impl ThresholdOracle {
    pub fn new(errors: u8, window_size: u8) -> Self {
        Self {
            errors,
            window_size,
            last: None,
        }
    }

    /// Returns `T(h)`, the minimum number of matching minimizer hashes
    /// required for a query with `h` total minimizer hashes to be considered
    /// a candidate.
    pub fn threshold(&mut self, h: u32) -> u32 {
        if let Some((last_h, last_t)) = self.last {
            if last_h == h {
                return last_t;
            }
        }
        let penalty = u32::from(self.errors) * u32::from(self.window_size);
        let t = h.saturating_sub(penalty);
        self.last = Some((h, t));
        t
    }
}
