use crate::cli::ServeArgs;
use crate::infra::{build_contact_service, http_client, AppState, InMemoryRequestRepository};
use crate::routes::app_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use inaproperty::config::AppConfig;
use inaproperty::error::AppError;
use inaproperty::telemetry;
use inaproperty::workflows::requests::RequestDeskService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryRequestRepository::default());
    let request_service = Arc::new(RequestDeskService::new(repository));
    let contact_service = Arc::new(build_contact_service(&config, http_client()?));

    let app = app_router(request_service, contact_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        operator = %config.contact.operator_email,
        "request desk ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
