pub mod data_models;
pub mod dataset;

pub use data_models::*;
pub use dataset::*;
