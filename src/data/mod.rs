/// Data layer: core types, loading, and the sweep summary.
///
/// Architecture:
/// ```text
///  <prefix>-position-<id>.csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table → EntitySeries / PairSeries / ScalarSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  model    │  immutable series, indexed by time step
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  summary  │  sort rows, Pearson correlation matrix
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod summary;
