use eframe::egui;
use peakview::app::PeakViewApp;
use peakview::config::Settings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Peakview – Series Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(PeakViewApp::new(settings)))),
    )
}
