use super::model::{ListingRecord, NormalizedRecord};
use super::parse::{FloorPart, parse_area, parse_currency, parse_floor};

/// Derive the numeric columns for every listing.
///
/// Row order and count are preserved and each row is parsed on its own, so a
/// garbled cell only ever blanks its own derived value.
pub fn normalize(records: &[ListingRecord]) -> Vec<NormalizedRecord> {
    records.iter().map(normalize_one).collect()
}

fn normalize_one(listing: &ListingRecord) -> NormalizedRecord {
    let floor = listing.floor.as_deref();
    NormalizedRecord {
        amount: parse_currency(listing.amount.as_deref()),
        carpet_area: parse_area(listing.carpet_area.as_deref()),
        super_area: parse_area(listing.super_area.as_deref()),
        current_floor: parse_floor(floor, FloorPart::Current),
        total_floors: parse_floor(floor, FloorPart::Total),
        listing: listing.clone(),
    }
}
