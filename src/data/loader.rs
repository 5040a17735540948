use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use thiserror::Error;

use super::model::{ListingDataset, ListingRecord};

/// Cell values read as missing, matching what spreadsheet exports and
/// dataframe libraries write for "no value".
const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("expected a top-level JSON array of listings")]
    NotAnArray,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and normalize a listings file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with the listing columns; UTF-8 or ISO-8859-1
/// * `.json` – `[{ "Amount(in rupees)": "1.2 Cr", "location": "...", ... }, ...]`
pub fn load_file(path: &Path) -> Result<ListingDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let listings = match ext.as_str() {
        "csv" | "txt" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_csv(file)?
        }
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            read_json(&text)?
        }
        other => return Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    };

    Ok(ListingDataset::from_listings(&listings))
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Read listings from CSV bytes. Every column in [`ListingRecord::COLUMNS`]
/// must be present; other columns are ignored.
pub fn read_csv<R: Read>(source: R) -> Result<Vec<ListingRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let headers: Vec<String> = reader
        .byte_headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| decode_field(h).trim().to_string())
        .collect();

    let mut idx = [0usize; 8];
    for (slot, name) in idx.iter_mut().zip(ListingRecord::COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))?;
    }

    let mut listings = Vec::new();
    for (row_no, result) in reader.byte_records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let cell = |i: usize| record.get(idx[i]).and_then(|raw| clean_cell(decode_field(raw)));

        listings.push(ListingRecord {
            amount: cell(0),
            carpet_area: cell(1),
            super_area: cell(2),
            floor: cell(3),
            location: cell(4),
            ownership: cell(5),
            transaction: cell(6),
            status: cell(7),
        });
    }
    Ok(listings)
}

/// UTF-8 when valid, otherwise ISO-8859-1 (every byte is its own code point).
fn decode_field(raw: &[u8]) -> String {
    match std::str::from_utf8(raw) {
        Ok(s) => s.to_string(),
        Err(_) => raw.iter().map(|&b| b as char).collect(),
    }
}

fn clean_cell(value: String) -> Option<String> {
    if NA_TOKENS.contains(&value.as_str()) {
        None
    } else {
        Some(value)
    }
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Read listings from a records-oriented JSON array.
pub fn read_json(text: &str) -> Result<Vec<ListingRecord>> {
    let root: serde_json::Value = serde_json::from_str(text).context("parsing JSON")?;
    if !root.is_array() {
        return Err(LoadError::NotAnArray.into());
    }
    let listings: Vec<ListingRecord> =
        serde_json::from_value(root).context("decoding listing objects")?;

    Ok(listings
        .into_iter()
        .map(|l| ListingRecord {
            amount: l.amount.and_then(clean_cell),
            carpet_area: l.carpet_area.and_then(clean_cell),
            super_area: l.super_area.and_then(clean_cell),
            floor: l.floor.and_then(clean_cell),
            location: l.location.and_then(clean_cell),
            ownership: l.ownership.and_then(clean_cell),
            transaction: l.transaction.and_then(clean_cell),
            status: l.status.and_then(clean_cell),
        })
        .collect())
}

// ---------------------------------------------------------------------------
// DatasetCache – memoized loads keyed by path
// ---------------------------------------------------------------------------

/// Normalized datasets keyed by source path. Owned by whoever drives the
/// pipeline; nothing here is process-global.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<PathBuf, Arc<ListingDataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading it on first use.
    pub fn get_or_load(&mut self, path: &Path) -> Result<Arc<ListingDataset>> {
        if let Some(ds) = self.entries.get(path) {
            log::debug!("Cache hit for {}", path.display());
            return Ok(Arc::clone(ds));
        }
        let ds = Arc::new(load_file(path)?);
        log::info!("Loaded {} listings from {}", ds.len(), path.display());
        self.entries.insert(path.to_path_buf(), Arc::clone(&ds));
        Ok(ds)
    }

    /// Drop the cached entry so the next load re-reads the file.
    pub fn invalidate(&mut self, path: &Path) {
        self.entries.remove(path);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str =
        "Index,Amount(in rupees),Carpet Area,Super Area,Floor,location,Ownership,Transaction,Status";

    fn csv_with(rows: &[&str]) -> Vec<u8> {
        let mut text = String::from(HEADER);
        for r in rows {
            text.push('\n');
            text.push_str(r);
        }
        text.into_bytes()
    }

    #[test]
    fn reads_rows_and_maps_na_tokens() {
        let bytes = csv_with(&[
            r#"0,1.2 Cr,"1,200 sqft",,3 out of 10,thane,Freehold,Resale,Ready to Move"#,
            "1,N/A,NA,null,,agra,,New Property,",
        ]);
        let rows = read_csv(bytes.as_slice()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].amount.as_deref(), Some("1.2 Cr"));
        assert_eq!(rows[0].carpet_area.as_deref(), Some("1,200 sqft"));
        assert_eq!(rows[0].super_area, None);
        assert_eq!(rows[0].status.as_deref(), Some("Ready to Move"));
        assert_eq!(rows[1].amount, None);
        assert_eq!(rows[1].carpet_area, None);
        assert_eq!(rows[1].super_area, None);
        assert_eq!(rows[1].location.as_deref(), Some("agra"));
        assert_eq!(rows[1].ownership, None);
    }

    #[test]
    fn decodes_latin1_bytes() {
        let mut bytes = csv_with(&[]);
        bytes.extend_from_slice(b"\n0,85 Lac,650 sqft,,1 out of 4,");
        bytes.push(0xE9); // é in ISO-8859-1, invalid as UTF-8
        bytes.extend_from_slice(b"pune,Freehold,Resale,Ready to Move");
        let rows = read_csv(bytes.as_slice()).unwrap();
        assert_eq!(rows[0].location.as_deref(), Some("\u{e9}pune"));
    }

    #[test]
    fn missing_column_is_an_error() {
        let bytes = b"Amount(in rupees),Carpet Area\n1 Cr,900 sqft".to_vec();
        let err = read_csv(bytes.as_slice()).unwrap_err();
        let load_err = err.downcast_ref::<LoadError>().unwrap();
        assert!(matches!(load_err, LoadError::MissingColumn("Super Area")));
    }

    #[test]
    fn reads_json_records() {
        let text = r#"[
            {"Amount(in rupees)": "85 Lac", "Carpet Area": "650 sqft", "Floor": "Ground out of 2", "location": "pune"},
            {"Amount(in rupees)": "NA", "Status": "Ready to Move"}
        ]"#;
        let rows = read_json(text).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].floor.as_deref(), Some("Ground out of 2"));
        assert_eq!(rows[0].super_area, None);
        assert_eq!(rows[1].amount, None);
        assert_eq!(rows[1].status.as_deref(), Some("Ready to Move"));
    }

    #[test]
    fn json_numbers_become_text() {
        let text = r#"[
            {"Amount(in rupees)": 4500000, "Carpet Area": 650.5, "Floor": "2 out of 4", "location": "pune"},
            {"Amount(in rupees)": "1 Cr", "Super Area": null, "Status": true}
        ]"#;
        let rows = read_json(text).unwrap();
        assert_eq!(rows[0].amount.as_deref(), Some("4500000"));
        assert_eq!(rows[0].carpet_area.as_deref(), Some("650.5"));
        assert_eq!(rows[1].super_area, None);
        assert_eq!(rows[1].status.as_deref(), Some("true"));

        let ds = ListingDataset::from_listings(&rows);
        assert_eq!(ds.records[0].amount, Some(4_500_000.0));
        assert_eq!(ds.records[0].carpet_area, Some(650.5));
    }

    #[test]
    fn json_must_be_an_array() {
        let err = read_json(r#"{"location": "pune"}"#).unwrap_err();
        assert!(matches!(err.downcast_ref::<LoadError>(), Some(LoadError::NotAnArray)));
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load_file(Path::new("listings.xlsx")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn cache_loads_once_per_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("house_data.csv");
        std::fs::write(&path, csv_with(&["0,1 Cr,900 sqft,,2 out of 5,thane,,,"])).unwrap();

        let mut cache = DatasetCache::new();
        let first = cache.get_or_load(&path).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first.records[0].amount, Some(10_000_000.0));

        // Appending to the file does not show until the entry is invalidated.
        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"\n1,50 Lac,500 sqft,,1 out of 5,agra,,,").unwrap();
        drop(file);

        let second = cache.get_or_load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.entries.len(), 1);

        cache.invalidate(&path);
        let third = cache.get_or_load(&path).unwrap();
        assert_eq!(third.len(), 2);
    }

    #[test]
    fn cache_surfaces_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = DatasetCache::new();
        assert!(cache.get_or_load(&dir.path().join("absent.csv")).is_err());
        assert!(cache.entries.is_empty());
    }
}
