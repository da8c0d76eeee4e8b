use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use chat_ledger_service::{
    config::Config, error::AppError, jobs, logging, middleware::RequestLogging, routes,
    state::AppState,
};
use std::sync::Arc;
use tokio::sync::broadcast;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    let cfg = Config::from_env()?;
    logging::init_tracing(cfg.json_logs);

    let state = AppState::new(cfg);
    let cfg = Arc::clone(&state.config);

    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let sweeper = tokio::spawn(jobs::run_sweeper_loop(
        Arc::clone(&state.chat),
        cfg.sweep_interval,
        shutdown_rx,
    ));

    let bind_addr = cfg.bind_addr();
    tracing::info!(
        %bind_addr,
        sweep_interval_ms = cfg.sweep_interval.as_millis() as u64,
        receiver_redaction = ?cfg.receiver_redaction,
        "starting chat-ledger-service"
    );

    let app_state = state.clone();
    let result = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(Cors::permissive())
            .wrap(RequestLogging::new())
            .configure(routes::configure)
    })
    .bind(&bind_addr)
    .map_err(|e| AppError::StartServer(format!("bind {bind_addr}: {e}")))?
    .run()
    .await
    .map_err(|e| AppError::StartServer(e.to_string()));

    let _ = shutdown_tx.send(());
    if let Err(e) = sweeper.await {
        tracing::error!(error = %e, "expiry sweeper task panicked");
    }
    tracing::info!("chat-ledger-service stopped");

    result
}
