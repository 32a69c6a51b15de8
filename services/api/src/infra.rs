use job_board::board::{ApplicationStatus, BoardEngine, HttpApplicationStore, StoreError};
use job_board::config::StoreConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn build_engine(
    config: &StoreConfig,
) -> Result<BoardEngine<HttpApplicationStore>, StoreError> {
    let store = HttpApplicationStore::new(config)?;
    info!(
        base_url = store.base_url(),
        timeout = ?config.timeout,
        "application store configured"
    );
    Ok(BoardEngine::new(Arc::new(store)))
}

pub(crate) fn parse_status(raw: &str) -> Result<ApplicationStatus, String> {
    raw.parse::<ApplicationStatus>().map_err(|err| {
        let known: Vec<&str> = ApplicationStatus::ordered()
            .into_iter()
            .map(ApplicationStatus::label)
            .collect();
        format!("{err} (expected one of: {})", known.join(", "))
    })
}
