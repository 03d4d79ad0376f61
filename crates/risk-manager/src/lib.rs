pub mod alerts;
pub mod manager;
pub mod models;
pub mod radar;
pub mod weights;

pub use alerts::AlertService;
pub use manager::RiskManager;
pub use models::*;
pub use radar::{RadarScore, RadarScorer};
pub use weights::{CategoryWeights, WeightConfig};
