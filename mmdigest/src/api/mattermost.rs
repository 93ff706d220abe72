use crate::models::mattermost::MattermostPost;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, header};
use std::time::Duration;

#[async_trait]
pub trait MattermostApi {
    async fn create_post(&self, channel_id: &str, message: &str) -> Result<MattermostPost>;
}

pub struct MattermostClient {
    client: Client,
    base_url: String,
}

impl MattermostClient {
    pub fn new(base_url: String, token: String) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))
                .context("Invalid Mattermost token")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl MattermostApi for MattermostClient {
    async fn create_post(&self, channel_id: &str, message: &str) -> Result<MattermostPost> {
        let url = format!("{}/api/v4/posts", self.base_url);
        let body = serde_json::json!({
            "channel_id": channel_id,
            "message": message,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()
            .context("Mattermost rejected the post")?
            .json()
            .await?;
        Ok(response)
    }
}
