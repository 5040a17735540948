use std::collections::{BTreeMap, HashMap};

use super::model::NormalizedRecord;

// ---------------------------------------------------------------------------
// Summary KPIs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Kpis {
    pub count: usize,
    pub mean_price: Option<f64>,
    pub mean_carpet_area: Option<f64>,
}

pub fn kpis(subset: &[&NormalizedRecord]) -> Kpis {
    Kpis {
        count: subset.len(),
        mean_price: mean(subset.iter().filter_map(|r| r.amount)),
        mean_carpet_area: mean(subset.iter().filter_map(|r| r.carpet_area)),
    }
}

/// Arithmetic mean; `None` for an empty input.
pub fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Sample standard deviation (ddof = 1).
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values.iter().copied())?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

// ---------------------------------------------------------------------------
// Histogram + KDE
// ---------------------------------------------------------------------------

/// Equal-width histogram over `[min, max]`; the last bin is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub start: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// `None` when there are no values or no bins.
    pub fn new(values: &[f64], bins: usize) -> Option<Self> {
        if values.is_empty() || bins == 0 {
            return None;
        }
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, hi + 0.5) };
        let bin_width = (hi - lo) / bins as f64;

        let mut counts = vec![0usize; bins];
        for &v in values {
            let idx = (((v - lo) / bin_width) as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Some(Histogram { start: lo, bin_width, counts })
    }

    /// `(bin centre, count)` pairs.
    pub fn bars(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| (self.start + (i as f64 + 0.5) * self.bin_width, c))
    }

    pub fn end(&self) -> f64 {
        self.start + self.bin_width * self.counts.len() as f64
    }
}

/// Cells the values are binned into before the KDE is evaluated.
const KDE_GRID: usize = 512;

/// Gaussian KDE (Scott's rule) sampled across the histogram range and scaled
/// so its area matches the histogram's.
///
/// Values are first binned onto a fine grid, so the cost is
/// `KDE_GRID * samples` regardless of how many values there are.
/// Empty for fewer than two values or zero spread.
pub fn kde_curve(values: &[f64], histogram: &Histogram, samples: usize) -> Vec<[f64; 2]> {
    let Some(std) = sample_std(values) else {
        return Vec::new();
    };
    if std <= 0.0 || samples < 2 {
        return Vec::new();
    }
    let n = values.len() as f64;
    let bandwidth = std * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let scale = n * histogram.bin_width;
    let span = histogram.end() - histogram.start;
    let step = span / (samples - 1) as f64;

    let cell = span / KDE_GRID as f64;
    let mut weights = vec![0.0_f64; KDE_GRID];
    for &v in values {
        let idx = (((v - histogram.start) / cell) as usize).min(KDE_GRID - 1);
        weights[idx] += 1.0;
    }
    let grid: Vec<(f64, f64)> = weights
        .iter()
        .enumerate()
        .filter(|&(_, &w)| w > 0.0)
        .map(|(i, &w)| (histogram.start + (i as f64 + 0.5) * cell, w))
        .collect();

    (0..samples)
        .map(|i| {
            let x = histogram.start + i as f64 * step;
            let density: f64 = grid
                .iter()
                .map(|&(c, w)| w * (-0.5 * ((x - c) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            [x, density * scale]
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Category counts
// ---------------------------------------------------------------------------

/// Count occurrences, most frequent first; ties keep first-appearance order.
/// Missing values are not counted.
pub fn value_counts<'a>(values: impl IntoIterator<Item = Option<&'a str>>) -> Vec<(String, usize)> {
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for v in values.into_iter().flatten() {
        match order.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                order.insert(v, counts.len());
                counts.push((v.to_string(), 1));
            }
        }
    }
    // stable sort keeps first-appearance order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Listings per current floor, ascending, for floors below `max_floor`.
pub fn floor_counts(subset: &[&NormalizedRecord], max_floor: i64) -> Vec<(i64, usize)> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for floor in subset.iter().filter_map(|r| r.current_floor) {
        if floor < max_floor {
            *counts.entry(floor).or_default() += 1;
        }
    }
    counts.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Pie slices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PieSlice {
    pub label: String,
    /// Fraction of the total, 0..=1.
    pub share: f64,
    /// Degrees, counter-clockwise from the positive x axis.
    pub start_deg: f64,
    pub sweep_deg: f64,
}

pub fn pie_slices(counts: &[(String, usize)], start_deg: f64) -> Vec<PieSlice> {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return Vec::new();
    }
    let mut angle = start_deg;
    counts
        .iter()
        .map(|(label, count)| {
            let share = *count as f64 / total as f64;
            let slice = PieSlice {
                label: label.clone(),
                share,
                start_deg: angle,
                sweep_deg: share * 360.0,
            };
            angle += slice.sweep_deg;
            slice
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

pub const CORRELATION_COLUMNS: [&str; 5] = [
    "Amount (numeric)",
    "Carpet Area (sqft)",
    "Super Area (sqft)",
    "Current Floor",
    "Total Floors",
];

/// Pairwise-complete Pearson correlations over the derived columns.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub values: [[Option<f64>; 5]; 5],
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.values[row][col]
    }
}

fn numeric_columns(r: &NormalizedRecord) -> [Option<f64>; 5] {
    [
        r.amount,
        r.carpet_area,
        r.super_area,
        r.current_floor.map(|v| v as f64),
        r.total_floors.map(|v| v as f64),
    ]
}

pub fn correlation_matrix(subset: &[&NormalizedRecord]) -> CorrelationMatrix {
    let rows: Vec<[Option<f64>; 5]> = subset.iter().map(|r| numeric_columns(r)).collect();
    let mut values = [[None; 5]; 5];
    for i in 0..5 {
        for j in i..5 {
            let pairs: Vec<(f64, f64)> = rows
                .iter()
                .filter_map(|row| Some((row[i]?, row[j]?)))
                .collect();
            let r = if i == j {
                // a column with any spread correlates perfectly with itself
                pearson(&pairs).map(|_| 1.0)
            } else {
                pearson(&pairs)
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix { values }
}

/// Pearson correlation; `None` with fewer than two pairs or zero variance.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let mx = mean(pairs.iter().map(|p| p.0))?;
    let my = mean(pairs.iter().map(|p| p.1))?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{ListingDataset, ListingRecord};

    fn dataset() -> ListingDataset {
        let row = |amount: &str, area: &str, sup: &str, floor: &str, own: &str| ListingRecord {
            amount: Some(amount.to_string()),
            carpet_area: Some(area.to_string()),
            super_area: Some(sup.to_string()),
            floor: Some(floor.to_string()),
            ownership: Some(own.to_string()),
            ..Default::default()
        };
        ListingDataset::from_listings(&[
            row("50 Lac", "500 sqft", "700 sqft", "Ground out of 4", "Freehold"),
            row("1 Cr", "1000 sqft", "1300 sqft", "2 out of 10", "Leasehold"),
            row("1.5 Cr", "1500 sqft", "1800 sqft", "60 out of 70", "Freehold"),
            row("N/A", "800 sqft", "x", "2 out of 8", "Co-operative Society"),
        ])
    }

    fn subset(ds: &ListingDataset) -> Vec<&NormalizedRecord> {
        ds.records.iter().collect()
    }

    #[test]
    fn kpis_skip_missing_values() {
        let ds = dataset();
        let k = kpis(&subset(&ds));
        assert_eq!(k.count, 4);
        assert_eq!(k.mean_price, Some(10_000_000.0));
        assert_eq!(k.mean_carpet_area, Some(950.0));
    }

    #[test]
    fn kpis_of_empty_subset() {
        let k = kpis(&[]);
        assert_eq!(k.count, 0);
        assert_eq!(k.mean_price, None);
        assert_eq!(k.mean_carpet_area, None);
    }

    #[test]
    fn histogram_counts_every_value() {
        let values = [0.0, 1.0, 2.0, 3.0, 4.0, 10.0];
        let h = Histogram::new(&values, 5).unwrap();
        assert_eq!(h.start, 0.0);
        assert_eq!(h.bin_width, 2.0);
        assert_eq!(h.counts, vec![2, 2, 1, 0, 1]);
        assert_eq!(h.counts.iter().sum::<usize>(), values.len());
        let (centre, _) = h.bars().next().unwrap();
        assert_eq!(centre, 1.0);
    }

    #[test]
    fn histogram_of_constant_values() {
        let h = Histogram::new(&[5.0, 5.0], 4).unwrap();
        assert_eq!(h.start, 4.5);
        assert_eq!(h.end(), 5.5);
        assert_eq!(h.counts.iter().sum::<usize>(), 2);
        assert!(Histogram::new(&[], 4).is_none());
    }

    #[test]
    fn kde_area_tracks_histogram_area() {
        let values: Vec<f64> = (0..200).map(|i| (i % 20) as f64).collect();
        let h = Histogram::new(&values, 10).unwrap();
        let curve = kde_curve(&values, &h, 400);
        assert_eq!(curve.len(), 400);
        let dx = curve[1][0] - curve[0][0];
        let area: f64 = curve.iter().map(|p| p[1] * dx).sum();
        let hist_area = values.len() as f64 * h.bin_width;
        // tails outside the data range are cut off
        assert!(area > 0.8 * hist_area && area < 1.05 * hist_area, "{area} vs {hist_area}");
    }

    #[test]
    fn binned_kde_matches_direct_sum() {
        // skewed, like listing prices
        let values: Vec<f64> = (0..20_000).map(|i| ((i % 997) as f64 / 997.0).powi(3) * 1e7).collect();
        let h = Histogram::new(&values, 40).unwrap();
        let curve = kde_curve(&values, &h, 200);

        let n = values.len() as f64;
        let bandwidth = sample_std(&values).unwrap() * n.powf(-0.2);
        let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
        let peak = curve.iter().map(|p| p[1]).fold(0.0, f64::max);
        for &[x, y] in curve.iter().step_by(17) {
            let direct: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm
                * n
                * h.bin_width;
            assert!((y - direct).abs() < 0.01 * peak, "at {x}: {y} vs {direct}");
        }
    }

    #[test]
    fn kde_needs_spread() {
        let h = Histogram::new(&[3.0, 3.0, 3.0], 4).unwrap();
        assert!(kde_curve(&[3.0, 3.0, 3.0], &h, 50).is_empty());
        let h = Histogram::new(&[3.0], 4).unwrap();
        assert!(kde_curve(&[3.0], &h, 50).is_empty());
    }

    #[test]
    fn value_counts_orders_by_frequency_then_appearance() {
        let ds = dataset();
        let counts = value_counts(ds.records.iter().map(|r| r.listing.ownership.as_deref()));
        assert_eq!(
            counts,
            vec![
                ("Freehold".to_string(), 2),
                ("Leasehold".to_string(), 1),
                ("Co-operative Society".to_string(), 1),
            ]
        );
        assert!(value_counts([None, None]).is_empty());
    }

    #[test]
    fn floor_counts_drop_high_floors() {
        let ds = dataset();
        assert_eq!(floor_counts(&subset(&ds), 50), vec![(0, 1), (2, 2)]);
    }

    #[test]
    fn pie_slices_cover_full_circle() {
        let counts = vec![("Resale".to_string(), 3), ("New Property".to_string(), 1)];
        let slices = pie_slices(&counts, 140.0);
        assert_eq!(slices[0].start_deg, 140.0);
        assert_eq!(slices[0].sweep_deg, 270.0);
        assert_eq!(slices[1].start_deg, 410.0);
        assert_eq!(slices[1].share, 0.25);
        assert!(pie_slices(&[], 0.0).is_empty());
    }

    #[test]
    fn pearson_basics() {
        assert_eq!(pearson(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)]), Some(1.0));
        assert_eq!(pearson(&[(1.0, 3.0), (2.0, 2.0), (3.0, 1.0)]), Some(-1.0));
        assert_eq!(pearson(&[(1.0, 1.0)]), None);
        assert_eq!(pearson(&[(1.0, 1.0), (2.0, 1.0)]), None);
    }

    #[test]
    fn correlation_matrix_is_symmetric_pairwise() {
        let ds = dataset();
        let m = correlation_matrix(&subset(&ds));
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(m.get(i, j), m.get(j, i));
            }
        }
        // price and carpet area rise together on the three priced rows
        assert!((m.get(0, 1).unwrap() - 1.0).abs() < 1e-9);
        assert_eq!(m.get(0, 0), Some(1.0));
    }

    #[test]
    fn correlation_of_empty_subset_is_all_missing() {
        let m = correlation_matrix(&[]);
        assert!(m.values.iter().flatten().all(Option::is_none));
    }
}
