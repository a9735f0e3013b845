pub mod aggregator;
pub mod dashboard;
pub mod filter_engine;
pub mod schema_normalizer;

pub use aggregator::*;
pub use dashboard::*;
pub use filter_engine::*;
pub use schema_normalizer::*;
