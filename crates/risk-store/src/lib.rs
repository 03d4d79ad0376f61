pub mod db;
pub mod memory;

pub use db::RiskDb;
pub use memory::MemoryStore;
