/// Data layer: parsing, loading, normalization, filtering and statistics.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  read file → Vec<ListingRecord>   (memoized per path)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ normalize  │  parse price / areas / floor → NormalizedRecord
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  price / area ranges + locations → subset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  stats    │  KPIs, histograms, counts, correlation
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod stats;
