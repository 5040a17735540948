//! egui widgets: filter side panel, top bar and the chart dashboard.

pub mod charts;
pub mod panels;
