//! Multi-series composition: one panel per series sharing a horizontal axis.
//!
//! Pure presentation data; `ui::plot` turns a [`Figure`] into egui plots.

use std::collections::BTreeMap;

use eframe::egui::Color32;

use crate::color::generate_palette;
use crate::config::LayoutConfig;
use crate::data::model::{PeakSet, SeriesCollection};

/// One series' chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Series key.
    pub name: String,
    /// Y-axis title.
    pub title: String,
    pub color: Color32,
    /// `[x, y]` pairs in file order.
    pub line: Vec<[f64; 2]>,
    /// Peak markers for this series only; empty when no peaks were supplied.
    pub peaks: Vec<[f64; 2]>,
}

/// Stacked panels, top to bottom in upload order.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub panels: Vec<Panel>,
    pub panel_height: f32,
    pub reverse_x: bool,
}

impl Figure {
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// Total height of the stacked panels.
    pub fn height(&self) -> f32 {
        self.panel_height * self.panels.len() as f32
    }
}

/// Build a figure from the collection, pairing each series with its own peaks.
pub fn compose(
    collection: &SeriesCollection,
    peaks: Option<&BTreeMap<String, PeakSet>>,
    layout: &LayoutConfig,
) -> Figure {
    let palette = generate_palette(collection.len());

    let panels = collection
        .iter()
        .zip(palette)
        .map(|(series, color)| {
            let line = series
                .x
                .iter()
                .zip(&series.y)
                .map(|(&x, &y)| [x, y])
                .collect();
            let peaks = peaks
                .and_then(|p| p.get(&series.name))
                .map(|idx| series.points_at(idx))
                .unwrap_or_default();
            Panel {
                name: series.name.clone(),
                title: series.display_name.clone(),
                color,
                line,
                peaks,
            }
        })
        .collect();

    Figure {
        panels,
        panel_height: layout.panel_height,
        reverse_x: layout.reverse_x,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Series;

    fn series(name: &str, y: &[f64]) -> Series {
        let x = (0..y.len()).map(|i| i as f64 * 10.0).collect();
        Series::new(name, ["x".into(), "y".into()], x, y.to_vec())
    }

    #[test]
    fn empty_collection_has_no_panels() {
        let fig = compose(&SeriesCollection::new(), None, &LayoutConfig::default());
        assert!(fig.is_empty());
        assert_eq!(fig.height(), 0.0);
    }

    #[test]
    fn panels_follow_insertion_order_with_own_peaks() {
        let collection: SeriesCollection = [
            series("z_last", &[0.0, 2.0, 0.0]),
            series("a_first", &[0.0, 1.0, 5.0, 1.0]),
        ]
        .into_iter()
        .collect();
        let mut peaks = BTreeMap::new();
        peaks.insert("z_last".to_string(), vec![1]);
        peaks.insert("a_first".to_string(), vec![2]);

        let layout = LayoutConfig {
            panel_height: 250.0,
            reverse_x: false,
        };
        let fig = compose(&collection, Some(&peaks), &layout);

        assert_eq!(fig.panels.len(), 2);
        assert_eq!(fig.panels[0].name, "z_last");
        assert_eq!(fig.panels[0].title, "z last");
        assert_eq!(fig.panels[0].peaks, vec![[10.0, 2.0]]);
        assert_eq!(fig.panels[1].peaks, vec![[20.0, 5.0]]);
        assert_eq!(fig.panels[1].line.len(), 4);
        assert_eq!(fig.height(), 500.0);
        assert!(!fig.reverse_x);
    }

    #[test]
    fn missing_peaks_leave_markers_empty() {
        let collection: SeriesCollection = [series("s", &[0.0, 1.0, 0.0])].into_iter().collect();
        let fig = compose(&collection, Some(&BTreeMap::new()), &LayoutConfig::default());
        assert!(fig.panels[0].peaks.is_empty());
        let fig = compose(&collection, None, &LayoutConfig::default());
        assert!(fig.panels[0].peaks.is_empty());
    }
}
