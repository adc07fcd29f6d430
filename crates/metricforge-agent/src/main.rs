//! metricforge agent binary.
//!
//! Reads the declarative metric config, spawns one emission loop per
//! definition plus the push exporter, and serves the pull endpoint.

use tracing_subscriber::{fmt, EnvFilter};

use metricforge_agent::{app_state, config, push, router, scheduler};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    tracing::info!("starting metricforge agent");

    // Config errors are fatal before anything begins serving.
    let cfg = match config::load_from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(error = %e, "config load failed");
            std::process::exit(1);
        }
    };

    let state = app_state::AppState::new(cfg);

    let pusher = match push::Pusher::from_config(state.cfg(), state.registry()) {
        Ok(pusher) => pusher,
        Err(e) => {
            tracing::error!(error = %e, "push exporter init failed");
            std::process::exit(1);
        }
    };

    scheduler::spawn_emitters(state.registry(), &state.cfg().metrics);
    pusher.spawn();

    let listen = state.cfg().listen_addr();
    let app = router::build_router(state);

    tracing::info!(%listen, "metricforge-agent serving");
    let listener = tokio::net::TcpListener::bind(&listen).await.expect("failed to bind");

    axum::serve(listener, app).await.expect("server failed");
}
