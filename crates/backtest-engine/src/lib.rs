pub mod engine;
pub mod models;
pub mod seed;

pub use engine::{BacktestService, BacktestSimulator};
pub use models::*;
