use mimalloc::MiMalloc;
use soboite::backend::{BackendClient, MISSING_CONFIG_ADVISORY, build_http_client};
use soboite::config::Config;
use soboite::server::router::{SoboiteState, soboite_router};
use soboite::view::{ViewSources, Views};
use std::net::SocketAddr;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        loglevel = %cfg.basic.loglevel,
        backend_url = %cfg.backend.url.as_deref().unwrap_or("<none>"),
        restaurants_table = %cfg.backend.restaurants_table,
        status_table = %cfg.backend.status_table,
        proxy = %cfg.backend.proxy.as_ref().map_or("<none>", |u| u.as_str()),
    );

    let http = build_http_client(&cfg.backend)?;
    let backend = BackendClient::from_config(&cfg.backend, http);
    if backend.is_none() {
        warn!("{MISSING_CONFIG_ADVISORY}");
    }

    let views = Views::mount(&cfg.backend, backend.as_ref().map(ViewSources::from_client)).await?;

    let state = SoboiteState::new(views.clone(), backend, &cfg.backend);
    let app = soboite_router(state);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server has shut down gracefully.");

    views.unmount().await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
