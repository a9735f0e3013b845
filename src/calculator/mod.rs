pub mod tip_calculator;

pub use tip_calculator::*;
