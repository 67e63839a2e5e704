/// Data layer: core types, loading, joining, cleaning and storage.
///
/// Architecture:
/// ```text
///  messages.csv        categories.csv      (.csv / .json / .parquet)
///        │                    │
///        ▼                    ▼
///   ┌──────────┐        ┌──────────┐
///   │  loader   │        │  loader   │   parse file → Table
///   └──────────┘        └──────────┘
///        │                    │
///        └────────┬───────────┘
///                 ▼
///           ┌──────────┐
///           │   join    │   inner join on `id`
///           └──────────┘
///                 │
///                 ▼
///           ┌──────────┐
///           │  clean    │   split categories → dedup → one-hot genre
///           └──────────┘
///                 │
///                 ▼
///           ┌──────────┐
///           │  store    │   replace SQLite table
///           └──────────┘
/// ```

pub mod clean;
pub mod join;
pub mod loader;
pub mod model;
pub mod store;
