/// Data layer: core types, parsing, and peak detection.
///
/// Architecture:
/// ```text
///  .csv / .xls / .dat upload (bytes + filename)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse bytes → Series (first two columns)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────┐
///   │ SeriesCollection │  Series in upload order
///   └──────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  peaks    │  local maxima → threshold → min distance → PeakSet
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod peaks;
