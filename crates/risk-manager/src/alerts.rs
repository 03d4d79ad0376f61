use std::sync::Arc;

use risk_core::{
    Alert, AlertPageQuery, AlertSort, Page, RiskError, RiskLevel, RiskResult, RiskStore,
    SortOrder, TriggerRule,
};

use crate::models::{AlertDetail, AlertQuery};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

impl AlertQuery {
    /// Resolve raw parameters into a safe store query.
    ///
    /// Unknown level, sort or order values fall back to defaults instead of
    /// failing the request.
    pub fn sanitize(&self) -> (AlertPageQuery, i64, i64) {
        let level = self
            .level
            .as_deref()
            .filter(|l| !l.is_empty())
            .and_then(|l| l.parse::<RiskLevel>().ok());

        let sort = match self.sort.as_deref() {
            Some("riskIndex") | Some("risk_index") => AlertSort::RiskIndex,
            _ => AlertSort::Date,
        };

        let order = match self.order.as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        let page = self.page.unwrap_or(1).max(1);
        let size = self
            .size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let query = AlertPageQuery {
            offset: (page - 1).saturating_mul(size),
            limit: size,
            level,
            sort,
            order,
        };
        (query, page, size)
    }
}

/// Read-only access to generated alerts.
pub struct AlertService {
    store: Arc<dyn RiskStore>,
}

impl AlertService {
    pub fn new(store: Arc<dyn RiskStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, query: &AlertQuery) -> RiskResult<Page<Alert>> {
        let (page_query, page, size) = query.sanitize();

        let total = self.store.count_alerts(page_query.level).await?;
        let records = self.store.alert_page(&page_query).await?;

        Ok(Page {
            total,
            page,
            size,
            records,
        })
    }

    pub async fn detail(&self, id: i64) -> RiskResult<AlertDetail> {
        let alert = self
            .store
            .alert_by_id(id)
            .await?
            .ok_or_else(|| RiskError::not_found(format!("Alert not found: {id}")))?;

        let trigger_rules = parse_trigger_rules(id, alert.detail.as_deref());
        Ok(AlertDetail {
            alert,
            trigger_rules,
        })
    }
}

/// Trigger rules are optional enrichment. Detail that is not a JSON array
/// yields an empty list; array entries that are not rules are skipped.
fn parse_trigger_rules(id: i64, detail: Option<&str>) -> Vec<TriggerRule> {
    let json = match detail {
        Some(json) if !json.trim().is_empty() => json,
        _ => return Vec::new(),
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(json) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(alert_id = id, error = %e, "Failed to parse alert detail JSON");
            return Vec::new();
        }
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(rule) => Some(rule),
            Err(e) => {
                tracing::warn!(alert_id = id, index, error = %e, "Skipping malformed trigger rule");
                None
            }
        })
        .collect()
}
