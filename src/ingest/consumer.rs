use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::Message;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::ingest::FeedFrame;
use crate::observability::metrics::{FRAMES_REJECTED, PRICE_UPDATES_INGESTED};
use crate::price_store::PriceStore;

/// Streams quote frames from the feed topic into the price store.
///
/// This is the only place malformed feed input is handled: a frame that
/// fails to parse or screen is dropped without touching the store, so a
/// transient bad frame never destabilizes the cache.
pub struct FeedConsumer {
    consumer: StreamConsumer,
}

impl FeedConsumer {
    pub fn new(brokers: &str, topic: &str, group_id: &str) -> Result<Self> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("group.id", group_id)
            .set("enable.auto.commit", "true")
            .set("auto.offset.reset", "latest")
            .create()
            .map_err(|e| Error::KafkaError(e.to_string()))?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| Error::KafkaError(e.to_string()))?;

        Ok(FeedConsumer { consumer })
    }

    pub async fn run(&self, store: Arc<PriceStore>) {
        loop {
            match self.consumer.recv().await {
                Ok(message) => {
                    let Some(payload) = message.payload() else {
                        FRAMES_REJECTED.inc();
                        continue;
                    };

                    match FeedFrame::parse(payload) {
                        Some(frame) => {
                            store.ingest(
                                &frame.symbol,
                                &frame.exchange,
                                frame.market_type(),
                                frame.bid,
                                frame.ask,
                                frame.bid_size,
                                frame.ask_size,
                                frame.mark_price,
                            );
                            PRICE_UPDATES_INGESTED.inc();
                        }
                        None => {
                            FRAMES_REJECTED.inc();
                            debug!("dropped malformed feed frame");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "feed receive failed");
                }
            }
        }
    }
}
