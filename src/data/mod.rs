/// Data layer: core types, loading, filtering, and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  normalize header, coerce metrics → Table
///   └──────────┘   (cache: content-hash keyed, re-upload aware)
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Record>, resolved Schema, dimension index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply supplier/origin/destination predicates
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ aggregate │  KPIs + five grouped charts → Dashboard
///   └──────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod schema;
