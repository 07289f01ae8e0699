use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser; // for cli
use site_api::auth::UserDirectory;
use site_api::config::{Args, DeploymentProfile};
use site_api::{AppState, app};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "site_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // parse cli arguments
    let args = Args::parse();

    let users = match &args.users_file {
        Some(path) => UserDirectory::load(path)?,
        None => {
            tracing::warn!("No users file configured; login will reject every attempt");
            UserDirectory::default()
        }
    };
    tracing::info!(users = users.len(), "user directory loaded");

    if args.profile == DeploymentProfile::Development {
        tracing::warn!("Development profile: internal failure messages are returned to callers");
    }

    let bind_addr = args.bind_addr();
    let cleanup_every = args.cleanup_every();
    let state = AppState::new(args, users);

    state.limiter.start(cleanup_every);

    // session cleanup task
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            let removed = sessions.cleanup_expired();
            if removed > 0 {
                tracing::debug!(removed, "expired sessions removed");
            }
        }
    });

    let limiter = state.limiter.clone();
    let router = app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("site-api listening on http://{}", bind_addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    limiter.stop();
    tracing::info!("site-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
