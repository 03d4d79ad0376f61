pub mod error;
pub mod level;
pub mod rounding;
pub mod traits;
pub mod types;

pub use error::*;
pub use level::RiskLevel;
pub use traits::*;
pub use types::*;
