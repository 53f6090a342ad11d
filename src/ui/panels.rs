use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::Upload;
use crate::data::peaks::PeakConfig;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – peak settings and file errors
// ---------------------------------------------------------------------------

/// Raw peak settings as typed by the user, before validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingPeakConfig {
    pub threshold: f64,
    pub min_distance: i64,
}

impl From<&PeakConfig> for PendingPeakConfig {
    fn from(config: &PeakConfig) -> Self {
        Self {
            threshold: config.threshold,
            min_distance: config.min_distance as i64,
        }
    }
}

/// Render the left settings panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, pending: &mut PendingPeakConfig) {
    ui.heading("Peaks");
    ui.separator();

    ui.checkbox(&mut state.settings.show_peaks, "Show peaks");

    egui::Grid::new("peak_settings")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("Threshold");
            ui.add(egui::DragValue::new(&mut pending.threshold).speed(0.01));
            ui.end_row();

            ui.label("Min distance");
            ui.add(egui::DragValue::new(&mut pending.min_distance).speed(1.0));
            ui.end_row();
        });

    let current = PendingPeakConfig::from(&state.settings.peaks);
    ui.add_enabled_ui(*pending != current, |ui: &mut Ui| {
        if ui.button("Apply").clicked() {
            state.set_peak_config(pending.threshold, pending.min_distance);
        }
    });

    if state.is_persistent() {
        ui.add_space(8.0);
        ui.heading("Store");
        ui.separator();
        if ui.button("Clear store").clicked() {
            state.clear();
        }
    }

    if state.file_errors.is_empty() {
        return;
    }

    ui.add_space(8.0);
    ui.heading("Errors");
    ui.separator();
    ScrollArea::vertical()
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for err in &state.file_errors {
                ui.label(RichText::new(&err.filename).strong());
                ui.label(RichText::new(&err.message).color(Color32::RED));
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let peak_count: usize = state.peaks.values().map(Vec::len).sum();
        ui.label(format!(
            "{} series loaded, {} peaks",
            state.series.len(),
            peak_count
        ));

        if state.is_persistent() {
            ui.separator();
            ui.label("Persistent");
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Open data files")
        .add_filter("Supported files", &["csv", "xls", "xlsx", "dat"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xls", "xlsx"])
        .add_filter("Whitespace-delimited", &["dat"])
        .pick_files();

    let Some(paths) = files else {
        return;
    };

    let mut uploads = Vec::with_capacity(paths.len());
    let mut read_error = None;
    for path in &paths {
        match Upload::from_path(path) {
            Ok(upload) => uploads.push(upload),
            Err(e) => {
                log::error!("Failed to read file: {e:#}");
                read_error = Some(format!("Error: {e:#}"));
            }
        }
    }
    state.ingest(&uploads);
    if read_error.is_some() {
        state.status_message = read_error;
    }
}
