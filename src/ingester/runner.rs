//! Poll loop: fetch a batch, process each message fully, then advance the cursor

use super::{ChannelInfo, Update, UpdateSource};
use crate::error::Result;
use crate::pipeline::SignalPipeline;
use crate::types::RawMessage;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct UpdateLoop {
    source: Arc<dyn UpdateSource>,
    pipeline: Arc<SignalPipeline>,
    offset: i64,
    batch_limit: u32,
    retry_delay: Duration,
}

impl UpdateLoop {
    pub fn new(source: Arc<dyn UpdateSource>, pipeline: Arc<SignalPipeline>) -> Self {
        Self {
            source,
            pipeline,
            offset: 0,
            batch_limit: 50,
            retry_delay: Duration::from_secs(5),
        }
    }

    pub fn with_batch_limit(mut self, limit: u32) -> Self {
        self.batch_limit = limit;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    /// Next update id to request; only ever past fully processed updates
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Run until `shutdown` flips to true (or its sender is dropped). An
    /// in-flight message always finishes before the loop returns.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!("Polling {} from offset {}", self.source.name(), self.offset);

        loop {
            if *shutdown.borrow() {
                break;
            }

            let fetched = tokio::select! {
                res = self.source.fetch(self.offset, self.batch_limit) => res,
                _ = shutdown.changed() => break,
            };

            let updates = match fetched {
                Ok(updates) => updates,
                Err(e) => {
                    warn!("Fetching updates from {} failed: {}", self.source.name(), e);
                    tokio::select! {
                        _ = tokio::time::sleep(self.retry_delay) => continue,
                        _ = shutdown.changed() => break,
                    }
                }
            };

            if updates.is_empty() {
                debug!("No updates");
                continue;
            }

            for update in &updates {
                self.handle(update).await;
                self.offset = self.offset.max(update.update_id + 1);

                if *shutdown.borrow() {
                    info!("Shutdown requested, stopped after update {}", update.update_id);
                    return Ok(());
                }
            }
        }

        info!("Update loop stopped at offset {}", self.offset);
        Ok(())
    }

    async fn handle(&self, update: &Update) {
        let Some((message, body)) = update.channel_post() else {
            return;
        };

        let info = match self.source.channel_info(message.channel_ref).await {
            Ok(info) => info,
            Err(e) => {
                warn!("No channel info for {}: {}", message.channel_ref, e);
                ChannelInfo {
                    title: format!("channel#{}", message.channel_ref),
                    username: None,
                }
            }
        };

        let raw = RawMessage::new(body, message.date, info.username, info.title);
        let outcome = self.pipeline.process(&raw).await;
        debug!("Update {} -> {:?}", update.update_id, outcome);
    }
}
