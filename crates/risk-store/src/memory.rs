use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use risk_core::{
    Alert, AlertPageQuery, AlertSort, FactorSample, RiskLevel, RiskResult, RiskSample, RiskStore,
    SortOrder,
};

/// In-process store used by tests and demos.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    samples: Vec<RiskSample>,
    factors: Vec<FactorSample>,
    alerts: Vec<Alert>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_samples(self, samples: impl IntoIterator<Item = RiskSample>) -> RiskResult<Self> {
        for s in samples {
            self.upsert_risk_sample(s)?;
        }
        Ok(self)
    }

    pub fn with_factors(self, factors: impl IntoIterator<Item = FactorSample>) -> Self {
        for f in factors {
            self.insert_factor(f);
        }
        self
    }

    pub fn with_alerts(self, alerts: impl IntoIterator<Item = Alert>) -> Self {
        for a in alerts {
            self.insert_alert(a);
        }
        self
    }

    /// Insert or replace the sample for its date, keeping dates ascending.
    /// Out-of-range samples are rejected and nothing is stored.
    pub fn upsert_risk_sample(&self, sample: RiskSample) -> RiskResult<()> {
        sample.validate()?;
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        match inner.samples.binary_search_by_key(&sample.date, |s| s.date) {
            Ok(pos) => inner.samples[pos] = sample,
            Err(pos) => inner.samples.insert(pos, sample),
        }
        Ok(())
    }

    pub fn insert_factor(&self, factor: FactorSample) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        inner.factors.push(factor);
    }

    /// Insert an alert, assigning the next id.
    pub fn insert_alert(&self, mut alert: Alert) -> i64 {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        alert.id = inner.alerts.iter().map(|a| a.id).max().unwrap_or(0) + 1;
        let id = alert.id;
        inner.alerts.push(alert);
        id
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

fn level_matches(alert: &Alert, level: Option<RiskLevel>) -> bool {
    level.map_or(true, |l| alert.level == l.as_str())
}

#[async_trait]
impl RiskStore for MemoryStore {
    async fn risk_samples_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> RiskResult<Vec<RiskSample>> {
        Ok(self
            .read()
            .samples
            .iter()
            .filter(|s| s.date >= start && s.date <= end)
            .cloned()
            .collect())
    }

    async fn latest_risk_sample(&self) -> RiskResult<Option<RiskSample>> {
        Ok(self.read().samples.last().cloned())
    }

    async fn factors_for_date(&self, date: NaiveDate) -> RiskResult<Vec<FactorSample>> {
        Ok(self
            .read()
            .factors
            .iter()
            .filter(|f| f.date == date)
            .cloned()
            .collect())
    }

    async fn latest_factor_date(&self) -> RiskResult<Option<NaiveDate>> {
        Ok(self.read().factors.iter().map(|f| f.date).max())
    }

    async fn top_factors_by_abs_shap(
        &self,
        date: NaiveDate,
        n: usize,
    ) -> RiskResult<Vec<FactorSample>> {
        let mut factors = self.factors_for_date(date).await?;
        // Stable sort keeps stored order among equal magnitudes
        factors.sort_by(|a, b| b.abs_shap().cmp(&a.abs_shap()));
        factors.truncate(n);
        Ok(factors)
    }

    async fn alerts_between(&self, start: NaiveDate, end: NaiveDate) -> RiskResult<Vec<Alert>> {
        let mut alerts: Vec<Alert> = self
            .read()
            .alerts
            .iter()
            .filter(|a| a.date >= start && a.date <= end)
            .cloned()
            .collect();
        alerts.sort_by_key(|a| (a.date, a.id));
        Ok(alerts)
    }

    async fn count_alerts(&self, level: Option<RiskLevel>) -> RiskResult<i64> {
        Ok(self
            .read()
            .alerts
            .iter()
            .filter(|a| level_matches(a, level))
            .count() as i64)
    }

    async fn alert_page(&self, query: &AlertPageQuery) -> RiskResult<Vec<Alert>> {
        let mut alerts: Vec<Alert> = self
            .read()
            .alerts
            .iter()
            .filter(|a| level_matches(a, query.level))
            .cloned()
            .collect();

        alerts.sort_by(|a, b| {
            let ord = match query.sort {
                AlertSort::Date => a.date.cmp(&b.date),
                AlertSort::RiskIndex => a.risk_index.cmp(&b.risk_index),
            }
            .then(a.id.cmp(&b.id));
            match query.order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });

        Ok(alerts
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }

    async fn alert_by_id(&self, id: i64) -> RiskResult<Option<Alert>> {
        Ok(self.read().alerts.iter().find(|a| a.id == id).cloned())
    }
}
