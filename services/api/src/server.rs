use crate::cli::ServeArgs;
use crate::infra::{AppState, Stores};
use crate::routes::with_pathway_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use pathway::config::AppConfig;
use pathway::error::AppError;
use pathway::telemetry;
use std::sync::atomic::Ordering;
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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let stores = Stores::default();
    warn!("payments run against the in-process simulated processor");
    if config.identity.admin_emails.is_empty() {
        warn!("APP_ADMIN_EMAILS is empty; admin routes will reject every caller");
    }
    if config.payments.webhook_secret.is_none() {
        warn!("PAYMENT_WEBHOOK_SECRET is unset; the payment webhook is disabled");
    }

    let app = with_pathway_routes(&config, &stores)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, currency = %config.payments.currency, "pathway api ready");

    axum::serve(listener, app).await?;
    Ok(())
}
