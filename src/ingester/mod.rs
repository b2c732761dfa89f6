//! Inbound updates from the chat platform
//!
//! An [`UpdateSource`] yields raw update events and resolves channel info;
//! [`UpdateLoop`] drains it one message at a time into the pipeline.

mod runner;
pub mod telegram;


pub use runner::UpdateLoop;
pub use telegram::BotApiSource;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    NewChannelMessage,
    /// Anything the relay does not handle (edits, private chats, ...)
    Other(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub body: Option<String>,
    pub date: DateTime<Utc>,
    pub channel_ref: i64,
}

/// Raw update event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    /// Monotonic cursor of the feed
    pub update_id: i64,
    pub kind: EventKind,
    pub message: Option<ChannelMessage>,
}

impl Update {
    /// The channel message, if this is a new channel post with a non-blank body
    pub fn channel_post(&self) -> Option<(&ChannelMessage, &str)> {
        if self.kind != EventKind::NewChannelMessage {
            return None;
        }
        let message = self.message.as_ref()?;
        let body = message.body.as_deref()?;
        (!body.trim().is_empty()).then_some((message, body))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub title: String,
    /// Public username; matched against source ids
    pub username: Option<String>,
}

#[async_trait]
pub trait UpdateSource: Send + Sync {
    fn name(&self) -> &str;

    /// Updates with id >= `offset`, at most `limit` of them
    async fn fetch(&self, offset: i64, limit: u32) -> Result<Vec<Update>>;

    async fn channel_info(&self, channel_ref: i64) -> Result<ChannelInfo>;
}
