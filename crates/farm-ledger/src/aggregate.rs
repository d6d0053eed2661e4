use crate::error::{LedgerError, LedgerResult};

/// A parent record whose aggregate is the sum of its entries' amounts.
///
/// Both ledgers recompute the aggregate from the full entry list after every
/// mutation instead of adjusting it incrementally, so a record that drifted
/// (for example from a hand-edited store file) is repaired on its next write.
pub trait Ledger {
    type Entry;

    /// Lowest value the aggregate may take. `None` leaves it unbounded.
    const FLOOR: Option<f64> = None;

    fn entries(&self) -> &[Self::Entry];

    /// Contribution of one entry to the aggregate.
    fn amount(entry: &Self::Entry) -> f64;

    fn aggregate(&self) -> f64;

    fn set_aggregate(&mut self, value: f64);

    /// Sum of entry amounts, with the floor applied.
    fn expected_aggregate(&self) -> f64 {
        let sum: f64 = self.entries().iter().map(Self::amount).sum();
        match Self::FLOOR {
            Some(floor) => sum.max(floor),
            None => sum,
        }
    }

    /// Reset the aggregate from the entries and return the new value.
    ///
    /// A sum that overflows to infinity is rejected and the stored aggregate
    /// is left as it was.
    fn recompute(&mut self) -> LedgerResult<f64> {
        let value = self.expected_aggregate();
        if !value.is_finite() {
            return Err(LedgerError::validation("Total is too large to record."));
        }
        self.set_aggregate(value);
        Ok(value)
    }

    /// Whether the stored aggregate matches the entries.
    fn is_consistent(&self) -> bool {
        (self.aggregate() - self.expected_aggregate()).abs() <= f64::EPSILON * 1024.0
    }
}
