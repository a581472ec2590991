use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use clinic_rota::config::AppConfig;
use clinic_rota::error::AppError;
use clinic_rota::telemetry;
use clinic_rota::workflows::store::SharedStore;
use tracing::{debug, info};

use crate::cli::ServeArgs;
use crate::infra::{load_store, AppState};
use crate::routes::with_service_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(path) = args.config.take() {
        config.scheduling.config_path = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = load_store(
        config.scheduling.config_path.as_deref(),
        &config.scheduling.window,
    )?;
    store.subscribe(|snapshot| {
        debug!(
            vacations = snapshot.vacations.len(),
            providers = snapshot.providers.len(),
            "store state changed"
        );
    });
    let store: SharedStore = Arc::new(Mutex::new(store));

    let app = with_service_routes(store)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        window_start = %config.scheduling.window.start(),
        window_end = %config.scheduling.window.end(),
        "clinic rota scheduler ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
