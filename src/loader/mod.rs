pub mod csv_loader;
pub mod dataset_cache;

pub use csv_loader::*;
pub use dataset_cache::*;
