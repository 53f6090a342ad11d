use std::ops::RangeInclusive;

use eframe::egui::{self, ScrollArea, Ui};
use egui_plot::{GridMark, Line, MarkerShape, Plot, PlotPoint, PlotPoints, Points};

use crate::color::PEAK_COLOR;
use crate::figure::{Figure, Panel};

// ---------------------------------------------------------------------------
// Stacked series plots (central panel)
// ---------------------------------------------------------------------------

/// Render every panel of the figure, stacked, with linked x axes.
pub fn figure_plot(ui: &mut Ui, figure: &Figure, hovering_files: bool) {
    if figure.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            let hint = if hovering_files {
                "Drop to load"
            } else {
                "Drag and drop or open files  (File → Open…)"
            };
            ui.heading(hint);
        });
        return;
    }

    let link_group = egui::Id::new("shared_x_axis");

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for panel in &figure.panels {
                panel_plot(ui, panel, figure, link_group);
            }
        });
}

fn panel_plot(ui: &mut Ui, panel: &Panel, figure: &Figure, link_group: egui::Id) {
    // egui_plot has no reversed axis; plot -x and label the ticks with x.
    let sign = if figure.reverse_x { -1.0 } else { 1.0 };

    Plot::new(("series_plot", &panel.name))
        .height(figure.panel_height)
        .y_axis_label(panel.title.clone())
        .link_axis(link_group, [true, false])
        .link_cursor(link_group, [true, false])
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            format!("{}", axis_value(sign, mark.value))
        })
        .label_formatter(move |name: &str, value: &PlotPoint| {
            let prefix = if name.is_empty() {
                String::new()
            } else {
                format!("{name}\n")
            };
            format!("{prefix}x = {:.4}\ny = {:.4}", axis_value(sign, value.x), value.y)
        })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let points: PlotPoints = panel.line.iter().map(|&[x, y]| [sign * x, y]).collect();
            plot_ui.line(
                Line::new(points)
                    .name(&panel.title)
                    .color(panel.color)
                    .width(1.5),
            );

            if !panel.peaks.is_empty() {
                let markers: PlotPoints =
                    panel.peaks.iter().map(|&[x, y]| [sign * x, y]).collect();
                plot_ui.points(
                    Points::new(markers)
                        .name("peaks")
                        .shape(MarkerShape::Diamond)
                        .filled(true)
                        .radius(4.5)
                        .color(PEAK_COLOR),
                );
            }
        });
}

/// Undo the x flip for display; `+ 0.0` turns `-0.0` into `0.0`.
fn axis_value(sign: f64, plotted: f64) -> f64 {
    sign * plotted + 0.0
}
