//! Site input series: the shared historical dataset and a synthetic generator.

pub mod historical;
/// Seeded synthetic site year for demos and tests.
pub mod synthetic;

pub use historical::HistoricalData;
pub use synthetic::SyntheticSite;
