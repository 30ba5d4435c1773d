//! time-service binary entrypoint wiring configuration, metrics and the HTTP router.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use time_service::{
    clock::SystemClock,
    config::{AppConfig, LISTEN_PORT},
    routes,
    state::{AppState, SharedState},
};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // The local offset can only be read while the process is single-threaded,
    // so resolve it before the runtime starts its workers.
    let clock = SystemClock::local();
    let config = AppConfig::load().context("loading configuration")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;
    runtime.block_on(serve(config, clock))
}

async fn serve(config: AppConfig, clock: SystemClock) -> anyhow::Result<()> {
    let app_state = AppState::new(config, Arc::new(clock));
    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], LISTEN_PORT));
    info!(%addr, utc_offset = ?clock.offset(), "starting time service");

    let listener = TcpListener::bind(addr)
        .await
        .inspect_err(|err| error!(%addr, error = %err, "failed to bind listening port"))
        .context("binding server")?;
    let service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    info!("time service stopped");
    Ok(())
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state).layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
