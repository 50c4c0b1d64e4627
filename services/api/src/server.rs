use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryRoster};
use crate::routes::with_company_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;
use workforce::company::{CompanyService, RosterImporter};
use workforce::config::AppConfig;
use workforce::error::AppError;
use workforce::telemetry;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(seed_csv) = args.seed_csv.take() {
        config.roster.seed_csv = Some(seed_csv);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let roster = Arc::new(InMemoryRoster::default());
    let company_service = Arc::new(CompanyService::new(roster));

    if let Some(path) = &config.roster.seed_csv {
        let summary = RosterImporter::from_path(path, company_service.as_ref())?;
        info!(
            path = %path.display(),
            hired = summary.hired,
            teams = summary.teams_created,
            "roster seeded"
        );
    }

    let app = with_company_routes(company_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "workforce service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
