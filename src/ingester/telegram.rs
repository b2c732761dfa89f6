//! Telegram Bot API long-poll source
//!
//! The bot must be a member of every watched channel; channel posts arrive as
//! `channel_post` updates carrying the chat title and username.

use super::{ChannelInfo, ChannelMessage, EventKind, Update, UpdateSource};
use crate::config::TelegramConfig;
use crate::error::{RelayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

pub struct BotApiSource {
    http: Client,
    base_url: String,
    poll_timeout_secs: u64,
    channels: RwLock<HashMap<i64, ChannelInfo>>,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiUpdate {
    update_id: i64,
    channel_post: Option<ApiMessage>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    date: i64,
    chat: ApiChat,
    text: Option<String>,
    caption: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiChat {
    id: i64,
    title: Option<String>,
    username: Option<String>,
}

impl From<&ApiChat> for ChannelInfo {
    fn from(chat: &ApiChat) -> Self {
        ChannelInfo {
            title: chat
                .title
                .clone()
                .unwrap_or_else(|| format!("channel#{}", chat.id)),
            username: chat.username.clone(),
        }
    }
}

impl BotApiSource {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let token = config
            .bot_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| RelayError::Config("telegram.bot_token is required".to_string()))?;

        // Long polls must outlive the server-side wait
        let http = Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs + 10))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}", config.api_url.trim_end_matches('/'), token),
            poll_timeout_secs: config.poll_timeout_secs,
            channels: RwLock::new(HashMap::new()),
        })
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, method);
        let body = self.http.get(&url).query(query).send().await?.text().await?;
        unwrap_response(&body)
    }

    fn convert(&self, update: ApiUpdate) -> Update {
        let Some(post) = update.channel_post else {
            return Update {
                update_id: update.update_id,
                kind: EventKind::Other("unsupported".to_string()),
                message: None,
            };
        };

        self.channels
            .write()
            .insert(post.chat.id, ChannelInfo::from(&post.chat));

        Update {
            update_id: update.update_id,
            kind: EventKind::NewChannelMessage,
            message: Some(ChannelMessage {
                body: post.text.or(post.caption),
                date: DateTime::<Utc>::from_timestamp(post.date, 0).unwrap_or_else(Utc::now),
                channel_ref: post.chat.id,
            }),
        }
    }
}

fn unwrap_response<T: DeserializeOwned>(body: &str) -> Result<T> {
    let resp: ApiResponse<T> = serde_json::from_str(body)?;
    if !resp.ok {
        return Err(RelayError::Remote(
            resp.description.unwrap_or_else(|| "Bot API request failed".to_string()),
        ));
    }
    resp.result
        .ok_or_else(|| RelayError::Remote("Bot API response has no result".to_string()))
}

#[async_trait]
impl UpdateSource for BotApiSource {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn fetch(&self, offset: i64, limit: u32) -> Result<Vec<Update>> {
        let updates: Vec<ApiUpdate> = self
            .call(
                "getUpdates",
                &[
                    ("offset", offset.to_string()),
                    ("limit", limit.to_string()),
                    ("timeout", self.poll_timeout_secs.to_string()),
                    ("allowed_updates", r#"["channel_post"]"#.to_string()),
                ],
            )
            .await?;

        Ok(updates.into_iter().map(|u| self.convert(u)).collect())
    }

    async fn channel_info(&self, channel_ref: i64) -> Result<ChannelInfo> {
        let cached = self.channels.read().get(&channel_ref).cloned();
        if let Some(info) = cached {
            return Ok(info);
        }

        let chat: ApiChat = self
            .call("getChat", &[("chat_id", channel_ref.to_string())])
            .await?;
        let info = ChannelInfo::from(&chat);
        self.channels.write().insert(channel_ref, info.clone());
        Ok(info)
    }
}
