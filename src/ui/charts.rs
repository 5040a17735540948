use eframe::egui::{self, Align2, Color32, FontId, RichText, ScrollArea, Sense, Stroke, Ui, vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoint, PlotPoints, Points, Polygon, Text};

use crate::color::{contrast_text, coolwarm, generate_palette, palette_color};
use crate::data::stats::{CORRELATION_COLUMNS, CorrelationMatrix, PieSlice};
use crate::state::AppState;
use crate::view::{DashboardView, Distribution, format_mean, format_thousands};

const CHART_HEIGHT: f32 = 260.0;
const PRICE_BLUE: Color32 = Color32::from_rgb(76, 114, 176);
const AREA_ORANGE: Color32 = Color32::from_rgb(255, 165, 0);

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render KPIs, charts and the filtered table.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a listings file to begin  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("House Listings Analysis Dashboard");
            ui.add_space(6.0);

            ui.strong("Summary KPIs");
            kpi_row(ui, view);
            ui.separator();

            ui.strong("Visual Insights");
            ui.columns(2, |cols| {
                distribution_chart(
                    &mut cols[0],
                    "price_dist",
                    "Price Distribution",
                    "Amount (numeric)",
                    view.price.as_ref(),
                    PRICE_BLUE,
                );
                distribution_chart(
                    &mut cols[1],
                    "area_dist",
                    "Carpet Area Distribution",
                    "Carpet Area (sqft)",
                    view.carpet_area.as_ref(),
                    AREA_ORANGE,
                );
            });
            ui.columns(2, |cols| {
                scatter_chart(&mut cols[0], view);
                floor_chart(&mut cols[1], view);
            });
            ui.separator();

            ui.strong("Additional Visuals");
            ui.columns(2, |cols| {
                category_chart(
                    &mut cols[0],
                    "ownership",
                    "Ownership Type Distribution",
                    &view.ownership,
                    true,
                );
                transaction_pie(&mut cols[1], &view.transactions);
            });
            ui.columns(2, |cols| {
                category_chart(
                    &mut cols[0],
                    "status",
                    "Property Status Distribution",
                    &view.status,
                    false,
                );
                correlation_heatmap(&mut cols[1], &view.correlation);
            });
            ui.separator();

            egui::CollapsingHeader::new("Show Filtered Data")
                .id_salt("filtered_table")
                .default_open(false)
                .show(ui, |ui: &mut Ui| filtered_table(ui, state));
        });
}

// ---------------------------------------------------------------------------
// KPIs
// ---------------------------------------------------------------------------

fn kpi_row(ui: &mut Ui, view: &DashboardView) {
    let kpis = &view.kpis;
    ui.columns(3, |cols| {
        metric(&mut cols[0], "Total Listings", &format_thousands(kpis.count as f64));
        metric(&mut cols[1], "Avg. Price (₹)", &format_mean(kpis.mean_price));
        metric(&mut cols[2], "Avg. Carpet Area (sqft)", &format_mean(kpis.mean_carpet_area));
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).size(26.0).strong());
    });
}

// ---------------------------------------------------------------------------
// Histograms, scatter, floor counts
// ---------------------------------------------------------------------------

fn distribution_chart(
    ui: &mut Ui,
    id: &str,
    title: &str,
    x_label: &str,
    dist: Option<&Distribution>,
    color: Color32,
) {
    ui.label(RichText::new(title).strong());
    let Some(dist) = dist else {
        ui.weak("No values in the current selection.");
        return;
    };
    let width = dist.histogram.bin_width;
    let bars: Vec<Bar> = dist
        .histogram
        .bars()
        .map(|(centre, count)| Bar::new(centre, count as f64).width(width))
        .collect();

    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(x_label)
        .y_axis_label("Count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(color.gamma_multiply(0.7)));
            if !dist.kde.is_empty() {
                plot_ui.line(Line::new(PlotPoints::from(dist.kde.clone())).color(color).width(2.0));
            }
        });
}

fn scatter_chart(ui: &mut Ui, view: &DashboardView) {
    ui.label(RichText::new("Price vs. Carpet Area").strong());
    let [r, g, b, _] = PRICE_BLUE.to_array();
    Plot::new("price_vs_area")
        .height(CHART_HEIGHT)
        .x_axis_label("Carpet Area (sqft)")
        .y_axis_label("Amount (numeric)")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(view.price_vs_area.clone()))
                    .radius(2.5)
                    .color(Color32::from_rgba_unmultiplied(r, g, b, 128)),
            );
        });
}

fn floor_chart(ui: &mut Ui, view: &DashboardView) {
    ui.label(RichText::new("Current Floor Distribution").strong());
    let palette = generate_palette(view.floors.len());
    let bars: Vec<Bar> = view
        .floors
        .iter()
        .zip(palette)
        .map(|(&(floor, count), color)| {
            Bar::new(floor as f64, count as f64)
                .width(0.8)
                .name(format!("Floor {floor}"))
                .fill(color)
        })
        .collect();

    Plot::new("floors")
        .height(CHART_HEIGHT)
        .x_axis_label("Current Floor")
        .y_axis_label("Count")
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));
}

// ---------------------------------------------------------------------------
// Categorical counts
// ---------------------------------------------------------------------------

/// Bars for `(label, count)` pairs, one colour per category. Horizontal bars
/// put the most frequent category at the top.
fn category_chart(ui: &mut Ui, id: &str, title: &str, counts: &[(String, usize)], horizontal: bool) {
    ui.label(RichText::new(title).strong());
    if counts.is_empty() {
        ui.weak("No values in the current selection.");
        return;
    }
    let n = counts.len();
    // horizontal charts count positions top-down
    let position = move |i: usize| if horizontal { (n - 1 - i) as f64 } else { i as f64 };

    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, (label, count))| {
            Bar::new(position(i), *count as f64)
                .width(0.7)
                .name(label)
                .fill(palette_color(i, n))
        })
        .collect();
    let mut chart = BarChart::new(bars);
    if horizontal {
        chart = chart.horizontal();
    }

    let labels: Vec<String> = counts.iter().map(|(l, _)| l.clone()).collect();
    let label_at = move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
        let v = mark.value;
        let idx = v.round();
        if (v - idx).abs() > 1e-6 || idx < 0.0 || idx as usize >= n {
            return String::new();
        }
        let i = idx as usize;
        let i = if horizontal { n - 1 - i } else { i };
        labels[i].clone()
    };

    let plot = Plot::new(id).height(CHART_HEIGHT).allow_scroll(false);
    let plot = if horizontal {
        plot.y_axis_formatter(label_at).x_axis_label("Count")
    } else {
        plot.x_axis_formatter(label_at).y_axis_label("Count")
    };
    plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

// ---------------------------------------------------------------------------
// Transaction pie
// ---------------------------------------------------------------------------

/// Largest arc drawn as one polygon; keeps every piece convex.
const MAX_SEGMENT_DEG: f64 = 90.0;
const ARC_STEP_DEG: f64 = 3.0;

fn transaction_pie(ui: &mut Ui, slices: &[PieSlice]) {
    ui.label(RichText::new("Transaction Type Share").strong());
    if slices.is_empty() {
        ui.weak("No values in the current selection.");
        return;
    }
    let n = slices.len();
    Plot::new("transactions")
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-1.5)
        .include_x(1.5)
        .include_y(-1.4)
        .include_y(1.4)
        .show(ui, |plot_ui| {
            for (i, slice) in slices.iter().enumerate() {
                let color = palette_color(i, n);
                for points in wedge_segments(slice.start_deg, slice.sweep_deg) {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(points))
                            .fill_color(color)
                            .stroke(Stroke::new(1.0, Color32::WHITE))
                            .name(&slice.label),
                    );
                }
                let mid = (slice.start_deg + slice.sweep_deg / 2.0).to_radians();
                plot_ui.text(Text::new(
                    PlotPoint::new(1.2 * mid.cos(), 1.2 * mid.sin()),
                    format!("{}\n{:.1}%", slice.label, slice.share * 100.0),
                ));
            }
        });
}

/// Unit-circle wedge outlines, split so no piece spans more than
/// [`MAX_SEGMENT_DEG`].
fn wedge_segments(start_deg: f64, sweep_deg: f64) -> Vec<Vec<[f64; 2]>> {
    let pieces = (sweep_deg / MAX_SEGMENT_DEG).ceil().max(1.0) as usize;
    let piece_sweep = sweep_deg / pieces as f64;
    (0..pieces)
        .map(|p| {
            let from = start_deg + p as f64 * piece_sweep;
            let steps = (piece_sweep / ARC_STEP_DEG).ceil().max(1.0) as usize;
            let mut points = Vec::with_capacity(steps + 2);
            points.push([0.0, 0.0]);
            for s in 0..=steps {
                let a = (from + piece_sweep * s as f64 / steps as f64).to_radians();
                points.push([a.cos(), a.sin()]);
            }
            points
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

const SHORT_NAMES: [&str; 5] = ["Price", "Carpet", "Super", "Floor", "Total Fl."];

fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    ui.label(RichText::new("Correlation Heatmap").strong());
    let label_w = 130.0;
    let header_h = 20.0;
    let cell = ((ui.available_width() - label_w) / 5.0).clamp(30.0, 70.0);
    let size = vec2(label_w + cell * 5.0, header_h + cell * 5.0);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let font = FontId::proportional(12.0);
    let text_color = ui.visuals().text_color();

    for (j, name) in SHORT_NAMES.iter().enumerate() {
        let pos = rect.min + vec2(label_w + cell * (j as f32 + 0.5), header_h / 2.0);
        painter.text(pos, Align2::CENTER_CENTER, *name, font.clone(), text_color);
    }
    for (i, name) in CORRELATION_COLUMNS.iter().enumerate() {
        let y = rect.min.y + header_h + cell * i as f32;
        painter.text(
            egui::pos2(rect.min.x + label_w - 6.0, y + cell / 2.0),
            Align2::RIGHT_CENTER,
            *name,
            font.clone(),
            text_color,
        );
        for j in 0..5 {
            let min = egui::pos2(rect.min.x + label_w + cell * j as f32, y);
            let cell_rect = egui::Rect::from_min_size(min, vec2(cell, cell)).shrink(1.0);
            match matrix.get(i, j) {
                Some(r) => {
                    let fill = coolwarm(r);
                    painter.rect_filled(cell_rect, 0.0_f32, fill);
                    painter.text(
                        cell_rect.center(),
                        Align2::CENTER_CENTER,
                        format!("{r:.2}"),
                        font.clone(),
                        contrast_text(fill),
                    );
                }
                None => {
                    painter.rect_filled(cell_rect, 0.0_f32, ui.visuals().faint_bg_color);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Filtered data table
// ---------------------------------------------------------------------------

const TABLE_HEADERS: [&str; 13] = [
    "location",
    "Amount(in rupees)",
    "Amount (numeric)",
    "Carpet Area",
    "Carpet Area (sqft)",
    "Super Area",
    "Super Area (sqft)",
    "Floor",
    "Current Floor",
    "Total Floors",
    "Ownership",
    "Transaction",
    "Status",
];

fn filtered_table(ui: &mut Ui, state: &AppState) {
    let rows: Vec<_> = state.visible_records().collect();
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    let num = |v: Option<f64>| v.map(|v| format!("{v:.0}")).unwrap_or_default();
    let int = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();

    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(420.0)
        .columns(Column::auto().at_least(70.0).resizable(true), TABLE_HEADERS.len())
        .header(20.0, |mut header| {
            for name in TABLE_HEADERS {
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let r = rows[row.index()];
                let l = &r.listing;
                let cells = [
                    text(&l.location),
                    text(&l.amount),
                    num(r.amount),
                    text(&l.carpet_area),
                    num(r.carpet_area),
                    text(&l.super_area),
                    num(r.super_area),
                    text(&l.floor),
                    int(r.current_floor),
                    int(r.total_floors),
                    text(&l.ownership),
                    text(&l.transaction),
                    text(&l.status),
                ];
                for value in cells {
                    row.col(|ui| {
                        ui.label(value);
                    });
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wedges_stay_within_quarter_turns() {
        let pieces = wedge_segments(140.0, 270.0);
        assert_eq!(pieces.len(), 3);
        for piece in &pieces {
            assert_eq!(piece[0], [0.0, 0.0]);
            for p in &piece[1..] {
                let radius = (p[0] * p[0] + p[1] * p[1]).sqrt();
                assert!((radius - 1.0).abs() < 1e-9);
            }
        }
        // the last arc point lands on the slice end
        let last = pieces.last().unwrap().last().unwrap();
        let end = 410f64.to_radians();
        assert!((last[0] - end.cos()).abs() < 1e-9);
        assert!((last[1] - end.sin()).abs() < 1e-9);
    }

    #[test]
    fn thin_wedge_is_one_piece() {
        let pieces = wedge_segments(0.0, 1.0);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].len(), 3);
    }
}
