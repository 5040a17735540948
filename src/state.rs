use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::data::filter::{FilterConstraints, filtered_indices};
use crate::data::loader::DatasetCache;
use crate::data::model::{ListingDataset, NormalizedRecord};
use crate::view::DashboardView;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded, normalized datasets keyed by path.
    pub cache: DatasetCache,

    /// Dataset currently shown (None until a file is loaded).
    pub dataset: Option<Arc<ListingDataset>>,

    /// Path the current dataset came from.
    pub source_path: Option<PathBuf>,

    /// Location / price / area selections.
    pub constraints: FilterConstraints,

    /// Slider positions for price and area. They follow a drag and only
    /// reach `constraints` when the drag is released.
    pub price_draft: (f64, f64),
    pub area_draft: (f64, f64),

    /// Indices of records passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// Charts for the visible records, rebuilt on every filter change.
    pub view: Option<DashboardView>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            cache: DatasetCache::new(),
            dataset: None,
            source_path: None,
            constraints: FilterConstraints::default(),
            price_draft: (0.0, 0.0),
            area_draft: (0.0, 0.0),
            visible_indices: Vec::new(),
            view: None,
            status_message: None,
        }
    }

    /// Load `path` through the cache and show it. On failure the previous
    /// dataset stays on screen and the error goes to the status line.
    pub fn open_path(&mut self, path: &Path) {
        match self.cache.get_or_load(path) {
            Ok(dataset) => {
                if dataset.is_empty() {
                    log::warn!("{} has no listings", path.display());
                }
                log::info!(
                    "Showing {} listings across {} locations",
                    dataset.len(),
                    dataset.locations.len()
                );
                self.source_path = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Re-read the current file, bypassing the cache.
    pub fn reload(&mut self) {
        if let Some(path) = self.source_path.clone() {
            self.cache.invalidate(&path);
            self.open_path(&path);
        }
    }

    /// Ingest a dataset and reset the filters to cover all of it.
    pub fn set_dataset(&mut self, dataset: Arc<ListingDataset>) {
        self.constraints = FilterConstraints::unrestricted(&dataset);
        self.price_draft = self.constraints.price_range;
        self.area_draft = self.constraints.area_range;
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refilter();
    }

    /// Recompute `visible_indices` and the view after a filter change.
    pub fn refilter(&mut self) {
        let Some(ds) = &self.dataset else {
            self.visible_indices.clear();
            self.view = None;
            return;
        };
        self.visible_indices = filtered_indices(&ds.records, &self.constraints);
        let subset: Vec<&NormalizedRecord> =
            self.visible_indices.iter().map(|&i| &ds.records[i]).collect();
        self.view = Some(DashboardView::build(&subset, &self.config));
        log::debug!("{} of {} listings visible", subset.len(), ds.len());
    }

    /// Toggle one location in the multiselect.
    pub fn toggle_location(&mut self, location: &str) {
        if !self.constraints.locations.remove(location) {
            self.constraints.locations.insert(location.to_string());
        }
        self.refilter();
    }

    /// Clear the location selection (no location restriction).
    pub fn clear_locations(&mut self) {
        self.constraints.locations.clear();
        self.refilter();
    }

    /// Set the price range; the ends are swapped if given out of order.
    pub fn set_price_range(&mut self, lo: f64, hi: f64) {
        self.constraints.price_range = ordered(lo, hi);
        self.price_draft = self.constraints.price_range;
        self.refilter();
    }

    /// Set the carpet-area range; the ends are swapped if given out of order.
    pub fn set_area_range(&mut self, lo: f64, hi: f64) {
        self.constraints.area_range = ordered(lo, hi);
        self.area_draft = self.constraints.area_range;
        self.refilter();
    }

    /// Move the price sliders without refiltering.
    pub fn drag_price_range(&mut self, lo: f64, hi: f64) {
        self.price_draft = ordered(lo, hi);
    }

    /// Move the area sliders without refiltering.
    pub fn drag_area_range(&mut self, lo: f64, hi: f64) {
        self.area_draft = ordered(lo, hi);
    }

    /// Records currently passing the filters, in source order.
    pub fn visible_records(&self) -> impl Iterator<Item = &NormalizedRecord> + '_ {
        let records = self.dataset.as_deref().map_or(&[][..], |ds| &ds.records[..]);
        self.visible_indices.iter().filter_map(move |&i| records.get(i))
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}
