use std::net::SocketAddr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use herdbook_api::config::ServerConfig;
use herdbook_api::router::build_app_router;
use herdbook_api::state::AppState;
use herdbook_breeding::{LifecycleEngine, LogSink, NotificationSink, PushDelivery, ReminderScheduler};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "herdbook_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = herdbook_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    herdbook_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    herdbook_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // --- Lifecycle engine ---
    let engine = Arc::new(LifecycleEngine::new(pool.clone()));

    // --- Reminder scheduler ---
    let sink: Arc<dyn NotificationSink> = match &config.push_gateway_url {
        Some(url) => Arc::new(PushDelivery::new(url.clone())),
        None => {
            tracing::info!("No push gateway configured, reminders are logged only");
            Arc::new(LogSink)
        }
    };
    let scheduler = Arc::new(ReminderScheduler::new(pool.clone(), sink));
    let sweep_cancel = CancellationToken::new();

    let check_scheduler = Arc::clone(&scheduler);
    let check_cancel = sweep_cancel.clone();
    tokio::spawn(async move {
        check_scheduler.run_pregnancy_check_loop(check_cancel).await;
    });

    let separation_scheduler = Arc::clone(&scheduler);
    let separation_cancel = sweep_cancel.clone();
    tokio::spawn(async move {
        separation_scheduler.run_separation_loop(separation_cancel).await;
    });

    let milestone_scheduler = Arc::clone(&scheduler);
    let milestone_cancel = sweep_cancel.clone();
    tokio::spawn(async move {
        milestone_scheduler.run_milestone_loop(milestone_cancel).await;
    });

    tracing::info!("Reminder sweeps started (pregnancy checks, separations, milestones)");

    // --- App state and router ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        engine,
    };
    let app = build_app_router(state, &config);

    // --- Serve ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid HOST/PORT combination");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_cancel))
        .await
        .expect("Server error");
}

/// Resolve on Ctrl-C / SIGTERM, cancelling the background sweeps first.
async fn shutdown_signal(sweep_cancel: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    sweep_cancel.cancel();
}
