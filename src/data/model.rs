use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Series – one parsed file
// ---------------------------------------------------------------------------

/// Two-column numeric data parsed from a single uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    /// File base (extension stripped); unique key inside a collection.
    pub name: String,
    /// Human-readable name with separator characters replaced by spaces.
    pub display_name: String,
    /// Header labels of the first two columns.
    pub columns: [String; 2],
    /// First column (x).
    pub x: Vec<f64>,
    /// Second column (y) – same length as `x`.
    pub y: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, columns: [String; 2], x: Vec<f64>, y: Vec<f64>) -> Self {
        let name = name.into();
        Series {
            display_name: display_name(&name),
            name,
            columns,
            x,
            y,
        }
    }

    /// Number of (x, y) samples.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// The `(x, y)` pairs at the given sample indices. Out-of-range indices are skipped.
    pub fn points_at(&self, indices: &[usize]) -> Vec<[f64; 2]> {
        indices
            .iter()
            .filter_map(|&i| Some([*self.x.get(i)?, *self.y.get(i)?]))
            .collect()
    }
}

/// Replace `_`, `=`, `.`, `,` and whitespace with spaces.
pub fn display_name(base: &str) -> String {
    base.chars()
        .map(|c| {
            if matches!(c, '_' | '=' | '.' | ',') || c.is_whitespace() {
                ' '
            } else {
                c
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// PeakSet – detected peak indices for one series
// ---------------------------------------------------------------------------

/// Strictly increasing indices into a series' y values.
pub type PeakSet = Vec<usize>;

// ---------------------------------------------------------------------------
// SeriesCollection – insertion-ordered series keyed by name
// ---------------------------------------------------------------------------

/// Series in upload order. Inserting an existing name replaces it in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesCollection {
    series: Vec<Series>,
}

impl SeriesCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace. Returns the previous series with the same name, if any.
    pub fn insert(&mut self, series: Series) -> Option<Series> {
        match self.series.iter_mut().find(|s| s.name == series.name) {
            Some(slot) => Some(std::mem::replace(slot, series)),
            None => {
                self.series.push(series);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Series> {
        self.series.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.series.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn clear(&mut self) {
        self.series.clear();
    }
}

impl FromIterator<Series> for SeriesCollection {
    fn from_iter<I: IntoIterator<Item = Series>>(iter: I) -> Self {
        let mut collection = SeriesCollection::new();
        for series in iter {
            collection.insert(series);
        }
        collection
    }
}

impl<'a> IntoIterator for &'a SeriesCollection {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}
