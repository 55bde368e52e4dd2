use std::sync::Arc;
use tokio::time::Duration;
use tracing::{error, info};

use SpreadInfra::api::broadcast::BroadcastPublisher;
use SpreadInfra::api::rest::{ApiState, create_router};
use SpreadInfra::config::loader::AppConfig;
use SpreadInfra::detector::engine::{DetectorPolicy, OpportunityDetector};
use SpreadInfra::detector::SpreadTracker;
use SpreadInfra::ingest::consumer::FeedConsumer;
use SpreadInfra::metadata::registry::MetadataRegistry;
use SpreadInfra::metadata::source::RedisMetadataSource;
use SpreadInfra::observability::metrics::register_metrics;
use SpreadInfra::price_store::PriceStore;
use SpreadInfra::tasks::{DetectionTicker, EvictionTicker, RefreshTicker};
use SpreadInfra::utils::task_supervisor::TaskSupervisor;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let env = std::env::var("APP_ENV").unwrap_or_else(|_| "default".to_string());
    let config = AppConfig::load(&env)?;

    register_metrics();

    let store = Arc::new(PriceStore::new());
    let tracker = Arc::new(SpreadTracker::new());

    let source = Arc::new(RedisMetadataSource::connect(&config.redis.url).await?);
    let registry = Arc::new(MetadataRegistry::new(
        source,
        config.metadata.venues.clone(),
        config.engine.permissive_identity,
    ));

    let publisher = Arc::new(BroadcastPublisher::new(64));

    let detector = OpportunityDetector::new(
        registry.clone(),
        tracker.clone(),
        DetectorPolicy {
            min_spread_pct: config.engine.min_spread_pct,
            fee_offset: config.engine.fee_offset,
            require_metadata_ready: config.engine.require_metadata_ready,
        },
    );

    let mut supervisor = TaskSupervisor::new();

    let feed = FeedConsumer::new(
        &config.kafka.brokers,
        &config.kafka.topic,
        &config.kafka.group_id,
    )?;
    {
        let store = store.clone();
        supervisor.spawn("feed_ingest", async move {
            feed.run(store).await;
        });
    }

    let eviction = EvictionTicker::new(
        store.clone(),
        tracker.clone(),
        Duration::from_millis(config.engine.eviction_interval_ms),
        Duration::from_millis(config.engine.price_ttl_ms),
    );
    supervisor.spawn("price_eviction", async move {
        eviction.run().await;
    });

    let refresh = RefreshTicker::new(
        registry.clone(),
        Duration::from_millis(config.metadata.refresh_interval_ms),
        config.metadata.venues.len(),
    );
    supervisor.spawn("metadata_refresh", async move {
        refresh.run().await;
    });

    let detection = DetectionTicker::new(
        store.clone(),
        detector,
        publisher.clone(),
        Duration::from_millis(config.engine.detection_interval_ms),
    );
    supervisor.spawn("detection_publish", async move {
        detection.run().await;
    });

    let state = Arc::new(ApiState {
        publisher,
        registry,
    });
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    info!(addr = %config.server.bind_addr, "serving dashboard feed");

    let mut health = tokio::time::interval(Duration::from_secs(30));
    health.tick().await; // skip the immediate tick

    tokio::select! {
        result = async { axum::serve(listener, app).await } => {
            result?;
        }
        _ = async {
            loop {
                health.tick().await;
                if let Err(e) = supervisor.check_health().await {
                    error!(error = %e, "background task died");
                }
            }
        } => {}
    }

    Ok(())
}
