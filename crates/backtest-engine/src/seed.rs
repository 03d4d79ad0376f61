use chrono::NaiveDate;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};

use crate::models::BacktestModel;

/// Stable per-(date, model) seed: the first 8 bytes, little endian, of
/// SHA-256 over `"YYYY-MM-DD|Model"`.
pub fn daily_seed(date: NaiveDate, model: BacktestModel) -> u64 {
    let key = format!("{}|{}", date.format("%Y-%m-%d"), model.as_str());
    let digest = Sha256::digest(key.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Generator for one day of one model's simulated predictions.
pub fn daily_rng(date: NaiveDate, model: BacktestModel) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(daily_seed(date, model))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_seed_is_stable() {
        let d = date("2024-03-15");
        assert_eq!(daily_seed(d, BacktestModel::Lstm), daily_seed(d, BacktestModel::Lstm));

        let a: f64 = daily_rng(d, BacktestModel::Lstm).gen_range(-1.0..=1.0);
        let b: f64 = daily_rng(d, BacktestModel::Lstm).gen_range(-1.0..=1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_depends_on_date_and_model() {
        let d = date("2024-03-15");
        assert_ne!(daily_seed(d, BacktestModel::XgBoost), daily_seed(d, BacktestModel::Arima));
        assert_ne!(
            daily_seed(d, BacktestModel::XgBoost),
            daily_seed(date("2024-03-16"), BacktestModel::XgBoost)
        );
    }
}
