//! Upload → parse → detect → compose, as one interaction would run it.

use peakview::config::Settings;
use peakview::data::loader::{FILE_ERROR_MESSAGE, Upload, process_uploads};
use peakview::data::peaks::{PeakConfig, detect_all};
use peakview::figure::compose;
use peakview::state::AppState;
use peakview::store::{SeriesStore, SqliteStore};

fn csv_with_peak_at(peak: usize, n: usize) -> String {
    let mut body = String::from("x,y\n");
    for i in 0..n {
        let y = if i == peak { 10.0 } else { (i % 3) as f64 * 0.1 };
        body.push_str(&format!("{},{}\n", i as f64 * 0.5, y));
    }
    body
}

#[test]
fn each_panel_gets_its_own_peaks() {
    let uploads = vec![
        Upload::new("first_run.csv", csv_with_peak_at(5, 30).into_bytes()),
        Upload::new("bad.xls", b"definitely not excel".to_vec()),
        Upload::new("second run.dat", b"x y\n0 0\n1 1\n2 7\n3 1\n4 0\n".to_vec()),
    ];

    let outcome = process_uploads(&uploads);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(outcome.errors[0].filename, "bad.xls");
    assert_eq!(outcome.errors[0].message, FILE_ERROR_MESSAGE);

    let collection = outcome.collection();
    let peaks = detect_all(&collection, &PeakConfig::default()).unwrap();
    let figure = compose(&collection, Some(&peaks), &Settings::default().layout);

    assert_eq!(figure.panels.len(), 2);
    assert_eq!(figure.panels[0].title, "first run");
    assert_eq!(figure.panels[0].peaks, vec![[2.5, 10.0]]);
    assert_eq!(figure.panels[1].title, "second run");
    assert_eq!(figure.panels[1].peaks, vec![[2.0, 7.0]]);
    assert_eq!(figure.height(), 800.0);
}

#[test]
fn stored_series_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings {
        store_path: Some(dir.path().join("series.db")),
        ..Settings::default()
    };

    {
        let mut state = AppState::new(settings.clone());
        assert!(state.is_persistent());
        state.ingest(&[Upload::new("a.csv", csv_with_peak_at(4, 20).into_bytes())]);
        state.ingest(&[Upload::new("b.csv", csv_with_peak_at(12, 20).into_bytes())]);
        assert_eq!(state.series.names(), vec!["a.csv", "b.csv"]);
    }

    let state = AppState::new(settings.clone());
    assert_eq!(state.series.names(), vec!["a.csv", "b.csv"]);
    assert_eq!(state.peaks["b.csv"], vec![12]);

    let store = SqliteStore::open(dir.path().join("series.db")).unwrap();
    assert_eq!(store.keys().unwrap(), vec!["a.csv", "b.csv"]);
}
