pub mod calculator;
pub mod config;
pub mod export;
pub mod loader;
pub mod models;
pub mod processor;
