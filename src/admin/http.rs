//! HTTP/JSON implementation of the admin collaborator
//!
//! Thin glue between the collection core and whatever fronts the cluster's
//! admin API: every trait operation is one GET returning a JSON body shaped
//! like the types in [`crate::admin`]. Retry policy lives in the broker
//! poller, not here; a failed request maps straight to
//! [`CollectError::Admin`].

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::admin::{
    AdminClient, BrokerRuntimeStats, ClusterInfo, GroupList, TopicList, TopicStats,
};
use crate::error::{CollectError, Result};

/// Connection settings for [`HttpAdminClient`].
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Base URL of the admin endpoint, e.g. `http://127.0.0.1:9876/api`.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            endpoint: crate::config::DEFAULT_ADMIN_ENDPOINT.to_string(),
            timeout: Duration::from_secs(crate::config::DEFAULT_ADMIN_TIMEOUT_SECS),
        }
    }
}

/// JSON-over-HTTP [`AdminClient`].
pub struct HttpAdminClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpAdminClient {
    /// Build a client against the configured endpoint.
    pub fn new(config: &AdminConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(format!("queuescope/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CollectError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T>(&self, path: &str, query: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|e| CollectError::admin(path, e))?;

        if !response.status().is_success() {
            return Err(CollectError::admin(
                path,
                format!("status {}", response.status()),
            ));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| CollectError::admin(path, format!("bad response body: {}", e)))
    }
}

#[async_trait]
impl AdminClient for HttpAdminClient {
    async fn fetch_all_topics(&self) -> Result<TopicList> {
        self.get_json("/topic/list", &[]).await
    }

    async fn examine_broker_cluster_info(&self) -> Result<ClusterInfo> {
        self.get_json("/cluster/info", &[]).await
    }

    async fn fetch_broker_runtime_stats(&self, broker_addr: &str) -> Result<BrokerRuntimeStats> {
        self.get_json("/broker/runtime-stats", &[("addr", broker_addr)])
            .await
    }

    async fn examine_topic_stats(&self, topic: &str) -> Result<TopicStats> {
        self.get_json("/topic/stats", &[("topic", topic)]).await
    }

    async fn query_consumer_groups(&self) -> Result<GroupList> {
        self.get_json("/consumer/groups", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_normalized() {
        let client = HttpAdminClient::new(&AdminConfig {
            endpoint: "http://localhost:9876/api/".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(
            client.url("/topic/list"),
            "http://localhost:9876/api/topic/list"
        );
    }

    #[test]
    fn test_default_config() {
        let config = AdminConfig::default();
        assert!(!config.endpoint.is_empty());
        assert!(config.timeout > Duration::ZERO);
    }
}
