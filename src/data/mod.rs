/// Data layer: core types, loading, category detection, filtering and
/// aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → RestaurantTable
///   └──────────┘
///        │
///        ├──────────────► categories   0/1 columns → CategorySet (cached)
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterCriteria → matching row indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  counts / mean stars → RankedSeries
///   └───────────┘
/// ```
/// `analysis` strings the last three together for one recomputation.

pub mod aggregate;
pub mod analysis;
pub mod categories;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
