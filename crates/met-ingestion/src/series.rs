//! Daily series for one variable at one grid cell.

use chrono::NaiveDate;
use met_common::DateSpan;

/// Ordered `(date, value)` pairs with unique dates. Missing values are NaN.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailySeries {
    points: Vec<(NaiveDate, f64)>,
}

impl DailySeries {
    /// Build from fragments in the order they were read: sort by date and
    /// keep the first value seen for any repeated date.
    pub fn from_fragments<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = Vec<(NaiveDate, f64)>>,
    {
        let mut points: Vec<(NaiveDate, f64)> = fragments.into_iter().flatten().collect();
        // Stable sort keeps read order among equal dates
        points.sort_by_key(|(date, _)| *date);
        points.dedup_by_key(|(date, _)| *date);
        Self { points }
    }

    pub fn from_points(points: Vec<(NaiveDate, f64)>) -> Self {
        Self::from_fragments(std::iter::once(points))
    }

    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.points.iter().map(|(d, _)| *d)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|(_, v)| *v)
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(d, _)| *d)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }

    /// Value on `date`, if the date is present.
    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .binary_search_by_key(&date, |(d, _)| *d)
            .ok()
            .map(|i| self.points[i].1)
    }

    /// Values laid out on every day of `span`, NaN where absent.
    pub fn reindex(&self, span: &DateSpan) -> Vec<f64> {
        let mut out = vec![f64::NAN; span.len()];
        for (date, value) in &self.points {
            if let Some(i) = span.offset_of(*date) {
                out[i] = *value;
            }
        }
        out
    }

    /// Count of days between first and last date with no entry.
    pub fn gap_days(&self) -> usize {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => {
                ((last - first).num_days() as usize + 1).saturating_sub(self.points.len())
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_first_occurrence_wins() {
        let a = vec![(ymd(2035, 12, 31), 1.0), (ymd(2036, 1, 1), 2.0)];
        let b = vec![(ymd(2036, 1, 1), 99.0), (ymd(2036, 1, 2), 3.0)];
        let series = DailySeries::from_fragments(vec![a, b]);
        assert_eq!(series.len(), 3);
        assert_eq!(series.get(ymd(2036, 1, 1)), Some(2.0));
    }

    #[test]
    fn test_sorted_after_out_of_order_fragments() {
        let later = vec![(ymd(2036, 1, 1), 2.0)];
        let earlier = vec![(ymd(2035, 1, 1), 1.0)];
        let series = DailySeries::from_fragments(vec![later, earlier]);
        assert_eq!(series.first_date(), Some(ymd(2035, 1, 1)));
        assert_eq!(series.last_date(), Some(ymd(2036, 1, 1)));
        assert_eq!(series.gap_days(), 364);
    }

    #[test]
    fn test_reindex() {
        let series = DailySeries::from_points(vec![(ymd(2035, 1, 2), 5.0)]);
        let span = DateSpan::new(ymd(2035, 1, 1), ymd(2035, 1, 3)).unwrap();
        let values = series.reindex(&span);
        assert!(values[0].is_nan());
        assert_eq!(values[1], 5.0);
        assert!(values[2].is_nan());
    }
}
