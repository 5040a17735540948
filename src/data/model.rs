use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer};

use super::normalize::normalize;

// ---------------------------------------------------------------------------
// ListingRecord – one raw row of the source file
// ---------------------------------------------------------------------------

/// A listing exactly as read from the source; every field is free text and
/// may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListingRecord {
    #[serde(rename = "Amount(in rupees)", default, deserialize_with = "text_cell")]
    pub amount: Option<String>,
    #[serde(rename = "Carpet Area", default, deserialize_with = "text_cell")]
    pub carpet_area: Option<String>,
    #[serde(rename = "Super Area", default, deserialize_with = "text_cell")]
    pub super_area: Option<String>,
    #[serde(rename = "Floor", default, deserialize_with = "text_cell")]
    pub floor: Option<String>,
    #[serde(rename = "location", default, deserialize_with = "text_cell")]
    pub location: Option<String>,
    #[serde(rename = "Ownership", default, deserialize_with = "text_cell")]
    pub ownership: Option<String>,
    #[serde(rename = "Transaction", default, deserialize_with = "text_cell")]
    pub transaction: Option<String>,
    #[serde(rename = "Status", default, deserialize_with = "text_cell")]
    pub status: Option<String>,
}

impl ListingRecord {
    /// Source column headers, in file order.
    pub const COLUMNS: [&'static str; 8] = [
        "Amount(in rupees)",
        "Carpet Area",
        "Super Area",
        "Floor",
        "location",
        "Ownership",
        "Transaction",
        "Status",
    ];
}

/// A text column that may arrive as a JSON number or bool; those keep their
/// JSON spelling so the parsers see the same text a CSV export would carry.
fn text_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cell {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    Ok(Option::<Cell>::deserialize(deserializer)?.map(|cell| match cell {
        Cell::Text(text) => text,
        Cell::Number(n) => n.to_string(),
        Cell::Flag(b) => b.to_string(),
    }))
}

// ---------------------------------------------------------------------------
// NormalizedRecord – a listing plus its derived numeric columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    /// Original text, untouched.
    pub listing: ListingRecord,
    /// `Amount (numeric)`, in rupees.
    pub amount: Option<f64>,
    /// `Carpet Area (sqft)`.
    pub carpet_area: Option<f64>,
    /// `Super Area (sqft)`.
    pub super_area: Option<f64>,
    /// `Current Floor`; ground is 0.
    pub current_floor: Option<i64>,
    /// `Total Floors`.
    pub total_floors: Option<i64>,
}

impl NormalizedRecord {
    pub fn location(&self) -> Option<&str> {
        self.listing.location.as_deref()
    }
}

// ---------------------------------------------------------------------------
// ListingDataset – the complete normalized dataset
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct ListingDataset {
    pub records: Vec<NormalizedRecord>,
    /// Distinct non-missing locations, sorted.
    pub locations: BTreeSet<String>,
}

impl ListingDataset {
    /// Normalize raw listings and index their locations.
    pub fn from_listings(listings: &[ListingRecord]) -> Self {
        let records = normalize(listings);
        let locations = records
            .iter()
            .filter_map(|r| r.location())
            .map(str::to_string)
            .collect();
        ListingDataset { records, locations }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Smallest and largest known price, if any row has one.
    pub fn price_bounds(&self) -> Option<(f64, f64)> {
        bounds(self.records.iter().filter_map(|r| r.amount))
    }

    /// Smallest and largest known carpet area, if any row has one.
    pub fn area_bounds(&self) -> Option<(f64, f64)> {
        bounds(self.records.iter().filter_map(|r| r.carpet_area))
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
