use eframe::egui;

use crate::config::Settings;
use crate::data::loader::Upload;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PeakViewApp {
    pub state: AppState,
    /// Peak settings being edited; applied (and validated) on "Apply".
    pub pending: panels::PendingPeakConfig,
}

impl PeakViewApp {
    pub fn new(settings: Settings) -> Self {
        let pending = panels::PendingPeakConfig::from(&settings.peaks);
        Self {
            state: AppState::new(settings),
            pending,
        }
    }
}

impl Default for PeakViewApp {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl eframe::App for PeakViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Files dropped onto the window ----
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if !dropped.is_empty() {
            let uploads: Vec<Upload> = dropped.iter().filter_map(dropped_upload).collect();
            self.state.ingest(&uploads);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: peak settings, errors ----
        egui::SidePanel::left("settings_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &mut self.pending);
            });

        // ---- Central panel: stacked plots ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
            plot::figure_plot(ui, &self.state.figure(), hovering);
        });
    }
}

/// Dropped files carry bytes on the web and a path on native.
fn dropped_upload(file: &egui::DroppedFile) -> Option<Upload> {
    if let Some(bytes) = &file.bytes {
        return Some(Upload::new(file.name.clone(), bytes.to_vec()));
    }
    let path = file.path.as_ref()?;
    match Upload::from_path(path) {
        Ok(upload) => Some(upload),
        Err(e) => {
            log::error!("Failed to read dropped file: {e:#}");
            None
        }
    }
}
