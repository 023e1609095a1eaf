use crate::cli::ServeArgs;
use crate::infra::{
    default_scoring_config, seed_roster, AppState, InMemoryRoster, LoggingProgressSink,
};
use crate::routes::with_reward_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use reward_engine::config::AppConfig;
use reward_engine::error::AppError;
use reward_engine::telemetry;
use reward_engine::workflows::submissions::RewardService;
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

    let roster = Arc::new(InMemoryRoster::default());
    seed_roster(&roster);
    let progress = Arc::new(LoggingProgressSink::default());
    let reward_service = Arc::new(RewardService::new(
        roster,
        progress,
        default_scoring_config(),
    ));

    let app = with_reward_routes(reward_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "reward engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
