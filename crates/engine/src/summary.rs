//! Rating aggregation.
//!
//! Figures are always recomputed from the stored rating rows; nothing here is
//! persisted.

/// Average, count and 1-5 star distribution of a store's ratings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RatingSummary {
    pub store_id: i32,
    pub count: u64,
    /// Counts of 1 through 5 star ratings, in that order.
    pub distribution: [u64; 5],
}

impl RatingSummary {
    /// Summary of a store nobody has rated yet.
    pub fn empty(store_id: i32) -> Self {
        Self {
            store_id,
            ..Default::default()
        }
    }

    /// Tally raw rating values. Values outside 1..=5 cannot be stored and are
    /// skipped.
    pub fn from_values(store_id: i32, values: impl IntoIterator<Item = i32>) -> Self {
        let mut summary = Self::empty(store_id);
        for value in values {
            summary.record(value, 1);
        }
        summary
    }

    /// Add `times` ratings of `value`.
    pub fn record(&mut self, value: i32, times: u64) {
        if let Some(bucket) = bucket_index(value) {
            self.distribution[bucket] += times;
            self.count += times;
        }
    }

    /// Exact mean, `0.0` for an unrated store.
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let sum: u64 = self
            .distribution
            .iter()
            .zip(1u64..)
            .map(|(count, stars)| count * stars)
            .sum();
        sum as f64 / self.count as f64
    }

    /// Mean rounded to one decimal, half away from zero.
    pub fn average_display(&self) -> f64 {
        round_one_decimal(self.average())
    }
}

fn bucket_index(value: i32) -> Option<usize> {
    match value {
        1..=5 => usize::try_from(value - 1).ok(),
        _ => None,
    }
}

pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrated_store_is_all_zero() {
        let summary = RatingSummary::from_values(1, []);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average(), 0.0);
        assert_eq!(summary.average_display(), 0.0);
        assert_eq!(summary.distribution, [0; 5]);
    }

    #[test]
    fn mixed_ratings() {
        let summary = RatingSummary::from_values(9, [5, 5, 4, 3]);
        assert_eq!(summary.store_id, 9);
        assert_eq!(summary.count, 4);
        assert_eq!(summary.average(), 4.25);
        assert_eq!(summary.average_display(), 4.3);
        assert_eq!(summary.distribution, [0, 0, 1, 1, 2]);
    }

    #[test]
    fn out_of_range_values_are_skipped() {
        let summary = RatingSummary::from_values(1, [0, 6, 2, -1]);
        assert_eq!(summary.count, 1);
        assert_eq!(summary.distribution, [0, 1, 0, 0, 0]);
        assert_eq!(summary.average(), 2.0);
    }

    #[test]
    fn record_accepts_grouped_counts() {
        let mut summary = RatingSummary::empty(2);
        summary.record(1, 2);
        summary.record(4, 1);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average(), 2.0);
    }

    #[test]
    fn repeating_thirds_round_to_one_decimal() {
        let summary = RatingSummary::from_values(1, [5, 4, 4]);
        assert_eq!(summary.average_display(), 4.3);
        let summary = RatingSummary::from_values(1, [1, 1, 2]);
        assert_eq!(summary.average_display(), 1.3);
    }
}
