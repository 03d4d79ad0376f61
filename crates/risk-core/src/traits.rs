use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{Alert, AlertPageQuery, FactorSample, RiskLevel, RiskResult, RiskSample};

/// Read access to stored risk history.
///
/// The analytics core never writes through this trait; records are produced
/// by the upstream pipeline.
#[async_trait]
pub trait RiskStore: Send + Sync {
    /// Samples with `start <= date <= end`, ascending by date.
    async fn risk_samples_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RiskResult<Vec<RiskSample>>;

    async fn latest_risk_sample(&self) -> RiskResult<Option<RiskSample>>;

    /// All factor rows for `date`, in stored order.
    async fn factors_for_date(&self, date: NaiveDate) -> RiskResult<Vec<FactorSample>>;

    async fn latest_factor_date(&self) -> RiskResult<Option<NaiveDate>>;

    /// The `n` factors with the largest |shap| on `date`, descending.
    /// Ties keep stored order.
    async fn top_factors_by_abs_shap(
        &self,
        date: NaiveDate,
        n: usize,
    ) -> RiskResult<Vec<FactorSample>>;

    /// Alerts with `start <= date <= end`, ascending by date.
    async fn alerts_between(&self, start: NaiveDate, end: NaiveDate) -> RiskResult<Vec<Alert>>;

    async fn count_alerts(&self, level: Option<RiskLevel>) -> RiskResult<i64>;

    async fn alert_page(&self, query: &AlertPageQuery) -> RiskResult<Vec<Alert>>;

    async fn alert_by_id(&self, id: i64) -> RiskResult<Option<Alert>>;
}
