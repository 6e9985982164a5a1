use super::{FeedClient, RawItem};
use crate::config::ApiConfig;
use crate::error::{FeedError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

pub struct TwitterClient {
    base_url: String,
    token: String,
    timeline_count: u32,
    client: reqwest::Client,
}

impl TwitterClient {
    pub fn new(config: &ApiConfig, token: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("tweetline/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
            timeline_count: config.timeline_count,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(FeedError::RateLimited);
        }
        let body = response.text().await.unwrap_or_default();
        Err(FeedError::Status { status, body })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl FeedClient for TwitterClient {
    async fn home_timeline(&self, since_id: Option<u64>) -> Result<Vec<RawItem>> {
        let mut query = vec![
            ("count", self.timeline_count.to_string()),
            ("tweet_mode", "extended".to_string()),
        ];
        if let Some(since_id) = since_id {
            query.push(("since_id", since_id.to_string()));
        }

        let request = self
            .client
            .get(self.url("statuses/home_timeline.json"))
            .query(&query);
        let items: Vec<RawItem> = Self::decode(self.send(request).await?).await?;
        tracing::debug!(count = items.len(), ?since_id, "fetched home timeline");
        Ok(items)
    }

    async fn item(&self, id: u64) -> Result<RawItem> {
        let request = self
            .client
            .get(self.url(&format!("statuses/show/{}.json", id)))
            .query(&[("tweet_mode", "extended")]);
        match self.send(request).await {
            Ok(response) => Self::decode(response).await,
            Err(FeedError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                Err(FeedError::RemoteNotFound(id))
            }
            Err(e) => Err(e),
        }
    }

    async fn post(&self, text: &str, in_reply_to: Option<u64>) -> Result<RawItem> {
        let mut form = vec![("status", text.to_string())];
        if let Some(id) = in_reply_to {
            form.push(("in_reply_to_status_id", id.to_string()));
        }

        let request = self
            .client
            .post(self.url("statuses/update.json"))
            .form(&form);
        Self::decode(self.send(request).await?).await
    }

    async fn favorite(&self, id: u64) -> Result<()> {
        let request = self
            .client
            .post(self.url("favorites/create.json"))
            .query(&[("id", id)]);
        self.send(request).await?;
        Ok(())
    }

    async fn repost(&self, id: u64) -> Result<()> {
        let request = self
            .client
            .post(self.url(&format!("statuses/retweet/{}.json", id)));
        self.send(request).await?;
        Ok(())
    }
}
