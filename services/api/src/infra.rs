use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use workdesk::work::normalize_day;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Reads a command-line date; a full timestamp is accepted and cut to its calendar day.
pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    normalize_day(raw).ok_or_else(|| format!("failed to parse '{raw}' as an ISO-8601 date"))
}
