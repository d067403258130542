use crate::cli::ServeArgs;
use crate::infra::{load_catalog, load_strategies, AppState, InMemorySessionStore};
use crate::routes::with_assessment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use strainpoint::assessment::AssessmentService;
use strainpoint::config::AppConfig;
use strainpoint::error::AppError;
use strainpoint::telemetry::{self, LogOutput};
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, LogOutput::Stdout)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let catalog = load_catalog(config.assessment.catalog_path.as_deref())?;
    let strategies = load_strategies(config.assessment.strategy_path.as_deref())?;
    let criteria = catalog.len();
    let assessment_service = Arc::new(
        AssessmentService::new(
            Arc::new(catalog),
            Arc::new(strategies),
            Arc::new(InMemorySessionStore::default()),
            config.assessment.policy(),
        )
        .with_fixed_seed(config.assessment.shuffle_seed),
    );

    let app = with_assessment_routes(assessment_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, criteria, "assessment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
