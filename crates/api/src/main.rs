//! API server entry point.

use std::sync::Arc;

use api::config::Config;
use domain::LifecycleConfig;
use notifications::{
    BroadcastPublisher, NotificationPublisher, OrderStatusChanged, WebhookPublisher,
};
use order_store::{InMemoryOrderRepository, OrderRepository, PostgresOrderRepository};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!(%error, "failed to install SIGINT handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

async fn build_repository(config: &Config) -> Result<Arc<dyn OrderRepository>, BoxError> {
    let Some(url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, orders are kept in memory");
        return Ok(Arc::new(InMemoryOrderRepository::new()));
    };

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(url)
        .await?;
    let repository = PostgresOrderRepository::new(pool);
    repository.run_migrations().await?;
    tracing::info!("connected to Postgres order store");
    Ok(Arc::new(repository))
}

fn build_publisher(config: &Config) -> Result<Arc<dyn NotificationPublisher>, BoxError> {
    if let Some(url) = config.notify_webhook_url.as_deref() {
        let publisher = WebhookPublisher::new(url, config.notify_timeout)?;
        tracing::info!(url = publisher.url(), "status notifications go to webhook");
        return Ok(Arc::new(publisher));
    }

    let publisher = BroadcastPublisher::new(config.notify_channel_capacity);
    spawn_notification_logger(publisher.subscribe());
    Ok(Arc::new(publisher))
}

/// Logs every broadcast notification until the channel closes.
fn spawn_notification_logger(mut rx: broadcast::Receiver<OrderStatusChanged>) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => tracing::info!(
                    order_id = %event.order_id,
                    user_id = %event.user_id,
                    status = %event.new_status,
                    "{}",
                    event.subject()
                ),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "notification logger fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = Config::from_env()?;

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;

    // 3. Wire the order store and notification publisher
    let repository = build_repository(&config).await?;
    let publisher = build_publisher(&config)?;
    let lifecycle_config = LifecycleConfig {
        policy: config.transition_policy,
        publish_timeout: config.notify_timeout,
    };
    tracing::info!(policy = %lifecycle_config.policy, "order lifecycle configured");

    // 4. Build the application
    let state = api::create_state(repository, publisher, lifecycle_config);
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}
