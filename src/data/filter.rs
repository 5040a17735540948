use std::collections::BTreeSet;

use super::model::{ListingDataset, NormalizedRecord};

// ---------------------------------------------------------------------------
// Filter constraints: price / carpet area ranges and a location set
// ---------------------------------------------------------------------------

/// User-selected constraints. Ranges are inclusive on both ends.
/// An empty `locations` set means "any location".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterConstraints {
    pub price_range: (f64, f64),
    pub area_range: (f64, f64),
    pub locations: BTreeSet<String>,
}

impl FilterConstraints {
    /// Constraints spanning the whole dataset: every row with a known price
    /// and carpet area passes.
    pub fn unrestricted(dataset: &ListingDataset) -> Self {
        FilterConstraints {
            price_range: widen(dataset.price_bounds()),
            area_range: widen(dataset.area_bounds()),
            locations: BTreeSet::new(),
        }
    }

    /// Whether a single record passes every active constraint.
    ///
    /// A missing price or carpet area never satisfies its range.
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        if !in_range(record.amount, self.price_range) {
            return false;
        }
        if !in_range(record.carpet_area, self.area_range) {
            return false;
        }
        if self.locations.is_empty() {
            return true;
        }
        record
            .location()
            .is_some_and(|loc| self.locations.contains(loc))
    }
}

fn in_range(value: Option<f64>, (lo, hi): (f64, f64)) -> bool {
    value.is_some_and(|v| lo <= v && v <= hi)
}

fn widen(bounds: Option<(f64, f64)>) -> (f64, f64) {
    bounds.map_or((0.0, 0.0), |(lo, hi)| (lo.floor(), hi.ceil()))
}

/// Return indices of records that pass the constraints, in source order.
pub fn filtered_indices(records: &[NormalizedRecord], constraints: &FilterConstraints) -> Vec<usize> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| constraints.matches(r))
        .map(|(i, _)| i)
        .collect()
}

/// Return the records that pass the constraints as a new collection.
pub fn filter<'a>(
    records: &'a [NormalizedRecord],
    constraints: &FilterConstraints,
) -> Vec<&'a NormalizedRecord> {
    records.iter().filter(|r| constraints.matches(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ListingRecord;

    fn listing(amount: &str, area: &str, location: &str) -> ListingRecord {
        ListingRecord {
            amount: Some(amount.to_string()),
            carpet_area: Some(area.to_string()),
            location: Some(location.to_string()),
            ..Default::default()
        }
    }

    fn dataset() -> ListingDataset {
        ListingDataset::from_listings(&[
            listing("50 Lac", "500 sqft", "A"),
            listing("1 Cr", "1,000 sqft", "B"),
            listing("N/A", "700 sqft", "A"),
            listing("75 Lac", "abc", "B"),
            listing("2 Cr", "2,000 sqft", "A"),
        ])
    }

    #[test]
    fn unrestricted_keeps_rows_with_both_values() {
        let ds = dataset();
        let c = FilterConstraints::unrestricted(&ds);
        assert_eq!(c.price_range, (5_000_000.0, 20_000_000.0));
        assert_eq!(c.area_range, (500.0, 2000.0));
        assert_eq!(filtered_indices(&ds.records, &c), vec![0, 1, 4]);
    }

    #[test]
    fn unrestricted_widens_fractional_bounds() {
        let ds = ListingDataset::from_listings(&[
            listing("1000.4", "10.5 sqft", "A"),
            listing("2000.6", "20.5 sqft", "A"),
        ]);
        let c = FilterConstraints::unrestricted(&ds);
        assert_eq!(c.price_range, (1000.0, 2001.0));
        assert_eq!(c.area_range, (10.0, 21.0));
        assert_eq!(filter(&ds.records, &c).len(), 2);
    }

    #[test]
    fn ranges_are_inclusive() {
        let ds = dataset();
        let c = FilterConstraints {
            price_range: (5_000_000.0, 10_000_000.0),
            area_range: (500.0, 1000.0),
            locations: BTreeSet::new(),
        };
        assert_eq!(filtered_indices(&ds.records, &c), vec![0, 1]);
    }

    #[test]
    fn missing_values_never_match_a_range() {
        let ds = dataset();
        let c = FilterConstraints {
            price_range: (f64::MIN, f64::MAX),
            area_range: (f64::MIN, f64::MAX),
            locations: BTreeSet::new(),
        };
        for r in filter(&ds.records, &c) {
            assert!(r.amount.is_some());
            assert!(r.carpet_area.is_some());
        }
        assert_eq!(filter(&ds.records, &c).len(), 3);
    }

    #[test]
    fn location_set_restricts_to_strict_subset() {
        let ds = dataset();
        let all = FilterConstraints::unrestricted(&ds);
        let only_a = FilterConstraints {
            locations: BTreeSet::from(["A".to_string()]),
            ..all.clone()
        };
        let everything = filtered_indices(&ds.records, &all);
        let subset = filtered_indices(&ds.records, &only_a);
        assert_eq!(subset, vec![0, 4]);
        assert!(subset.len() < everything.len());
        assert!(subset.iter().all(|i| everything.contains(i)));
    }

    #[test]
    fn missing_location_fails_a_location_filter() {
        let mut listing = listing("1 Cr", "900 sqft", "A");
        listing.location = None;
        let ds = ListingDataset::from_listings(&[listing]);
        let mut c = FilterConstraints::unrestricted(&ds);
        assert_eq!(filter(&ds.records, &c).len(), 1);
        c.locations.insert("A".to_string());
        assert!(filter(&ds.records, &c).is_empty());
    }

    #[test]
    fn empty_dataset_excludes_everything() {
        let ds = ListingDataset::default();
        let c = FilterConstraints::unrestricted(&ds);
        assert_eq!(c.price_range, (0.0, 0.0));
        assert!(filter(&ds.records, &c).is_empty());
    }

    #[test]
    fn filter_leaves_source_untouched() {
        let ds = dataset();
        let before = ds.records.clone();
        let c = FilterConstraints::unrestricted(&ds);
        let _ = filter(&ds.records, &c);
        assert_eq!(ds.records, before);
    }
}
