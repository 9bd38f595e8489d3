/// Data layer: the in-memory table and its CSV loader.
///
/// Architecture:
/// ```text
///     data.csv
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table        (write_csv for the way back)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  headers + raw rows, cells interpreted on demand
///   └──────────┘
///        │
///        ▼
///   experiment reducers
/// ```

pub mod loader;
pub mod model;
