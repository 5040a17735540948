use crate::config::DashboardConfig;
use crate::data::model::NormalizedRecord;
use crate::data::stats::{
    CorrelationMatrix, Histogram, Kpis, PieSlice, correlation_matrix, floor_counts, kde_curve, kpis,
    pie_slices, value_counts,
};

/// Samples along each KDE overlay.
const KDE_SAMPLES: usize = 200;
/// Where the first transaction slice starts, in degrees.
const PIE_START_DEG: f64 = 140.0;

/// A histogram plus its smoothed density overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub histogram: Histogram,
    pub kde: Vec<[f64; 2]>,
}

impl Distribution {
    fn from_values(values: &[f64], bins: usize) -> Option<Self> {
        let histogram = Histogram::new(values, bins)?;
        let kde = kde_curve(values, &histogram, KDE_SAMPLES);
        Some(Distribution { histogram, kde })
    }
}

// ---------------------------------------------------------------------------
// DashboardView – everything the central panel draws
// ---------------------------------------------------------------------------

/// Chart-ready data for one filtered subset. Rebuilt whenever the filters
/// change; drawing a frame only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub kpis: Kpis,
    pub price: Option<Distribution>,
    pub carpet_area: Option<Distribution>,
    /// (carpet area, price)
    pub price_vs_area: Vec<[f64; 2]>,
    pub floors: Vec<(i64, usize)>,
    pub ownership: Vec<(String, usize)>,
    pub transactions: Vec<PieSlice>,
    pub status: Vec<(String, usize)>,
    pub correlation: CorrelationMatrix,
}

impl DashboardView {
    pub fn build(subset: &[&NormalizedRecord], config: &DashboardConfig) -> Self {
        let prices: Vec<f64> = subset.iter().filter_map(|r| r.amount).collect();
        let areas: Vec<f64> = subset.iter().filter_map(|r| r.carpet_area).collect();
        let price_vs_area = subset
            .iter()
            .filter_map(|r| Some([r.carpet_area?, r.amount?]))
            .collect();
        let transaction_counts =
            value_counts(subset.iter().map(|r| r.listing.transaction.as_deref()));

        DashboardView {
            kpis: kpis(subset),
            price: Distribution::from_values(&prices, config.histogram_bins),
            carpet_area: Distribution::from_values(&areas, config.histogram_bins),
            price_vs_area,
            floors: floor_counts(subset, config.max_floor),
            ownership: value_counts(subset.iter().map(|r| r.listing.ownership.as_deref())),
            transactions: pie_slices(&transaction_counts, PIE_START_DEG),
            status: value_counts(subset.iter().map(|r| r.listing.status.as_deref())),
            correlation: correlation_matrix(subset),
        }
    }
}

/// Round and group digits in threes: `1234567.4` → `"1,234,567"`.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}

/// A KPI mean as grouped digits, or `-` when there is nothing to average.
pub fn format_mean(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), format_thousands)
}

/// KPI text block used by `--summary`.
pub fn kpi_report(kpis: &Kpis) -> String {
    format!(
        "Total Listings: {}\nAvg. Price (Rs.): {}\nAvg. Carpet Area (sqft): {}",
        format_thousands(kpis.count as f64),
        format_mean(kpis.mean_price),
        format_mean(kpis.mean_carpet_area),
    )
}
