//! HTTP platform publisher
//!
//! Posts JSON payloads to per-platform endpoints. Endpoint URLs come from
//! configuration; a platform without a configured endpoint fails fast.

use haven_core::{
    models::{Platform, SocialPost},
    traits::PlatformPublisher,
    AppError, AppResult,
};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Request timeout for platform calls
const PUBLISH_TIMEOUT_SECS: u64 = 10;

/// HTTP implementation of PlatformPublisher
pub struct HttpPublisher {
    client: reqwest::Client,
    endpoints: HashMap<Platform, String>,
}

impl HttpPublisher {
    /// Create a publisher from platform-name -> endpoint URL configuration.
    /// Unknown platform names are ignored with a warning.
    pub fn new(endpoints: &HashMap<String, String>) -> Self {
        let endpoints = endpoints
            .iter()
            .filter_map(|(name, url)| match Platform::from_name(name) {
                Some(platform) => Some((platform, url.clone())),
                None => {
                    warn!("Ignoring endpoint for unknown platform: {}", name);
                    None
                }
            })
            .collect();

        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(PUBLISH_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
            endpoints,
        }
    }
}

#[async_trait]
impl PlatformPublisher for HttpPublisher {
    #[instrument(skip(self, post), fields(post_id = post.id))]
    async fn publish(&self, platform: Platform, post: &SocialPost) -> AppResult<String> {
        let endpoint = self.endpoints.get(&platform).ok_or_else(|| {
            AppError::PublishFailed {
                platform: platform.to_string(),
                reason: "no endpoint configured".to_string(),
            }
        })?;

        debug!("Publishing post {} to {}", post.id, platform);

        let response = self
            .client
            .post(endpoint)
            .json(&json!({
                "content": post.content,
                "media_urls": post.media_urls,
            }))
            .send()
            .await
            .map_err(|e| AppError::PublishFailed {
                platform: platform.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::PublishFailed {
                platform: platform.to_string(),
                reason: format!("platform returned {}", status),
            });
        }

        // Providers answer {"id": "..."} on success; fall back to an empty
        // identifier when the body is not in that shape.
        let external_id = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| body.get("id").and_then(|id| id.as_str().map(String::from)))
            .unwrap_or_default();

        Ok(external_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_platform_fails() {
        let publisher = HttpPublisher::new(&HashMap::new());
        let post = SocialPost::default();

        let result = publisher.publish(Platform::Facebook, &post).await;
        assert!(matches!(
            result,
            Err(AppError::PublishFailed { platform, .. }) if platform == "facebook"
        ));
    }

    #[test]
    fn test_unknown_platform_name_ignored() {
        let mut endpoints = HashMap::new();
        endpoints.insert(
            "facebook".to_string(),
            "https://graph.example.com/posts".to_string(),
        );
        endpoints.insert("myspace".to_string(), "https://example.com".to_string());

        let publisher = HttpPublisher::new(&endpoints);
        assert_eq!(publisher.endpoints.len(), 1);
        assert!(publisher.endpoints.contains_key(&Platform::Facebook));
    }
}
