use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRulesStore, OfflineEvaluator};
use crate::routes::with_portal_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use hai_portal::config::AppConfig;
use hai_portal::error::AppError;
use hai_portal::telemetry;
use hai_portal::workflows::approvals::{ApprovalRulesService, CoreClient};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let portal = portal_routes(&config)?;
    let app = portal
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "approval rules portal ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn portal_routes(config: &AppConfig) -> Result<Router, AppError> {
    match CoreClient::from_config(&config.core)? {
        Some(client) => {
            info!(core = client.base_url(), "proxying approval rules to core service");
            let client = Arc::new(client);
            let service = ApprovalRulesService::new(client.clone(), client);
            Ok(with_portal_routes(Arc::new(service)))
        }
        None => {
            warn!("HAI_CORE_URL is not set; serving in-memory rules with local evaluation");
            let service = ApprovalRulesService::new(
                Arc::new(InMemoryRulesStore::default()),
                Arc::new(OfflineEvaluator),
            );
            Ok(with_portal_routes(Arc::new(service)))
        }
    }
}
