use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{ConnectorClient, ToolQuery, ToolScope};
use crate::error::ClientError;

/// Aggregation service client over its `GET /tools` listing endpoint.
pub struct HttpConnectorClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HttpConnectorClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn query_params(query: &ToolQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("toolkit_slug", query.toolkit.clone())];
        match &query.scope {
            ToolScope::Toolkit => {}
            ToolScope::Connection(id) => params.push(("connected_account_id", id.clone())),
            ToolScope::User(key) => params.push(("user_id", key.clone())),
        }
        if let Some(page) = query.page {
            params.push(("limit", page.limit.to_string()));
            params.push(("offset", page.offset.to_string()));
        }
        params
    }
}

#[async_trait]
impl ConnectorClient for HttpConnectorClient {
    async fn list_tools(&self, query: &ToolQuery) -> Result<Value, ClientError> {
        let params = Self::query_params(query);
        debug!(toolkit = %query.toolkit, scope = ?query.scope, page = ?query.page, "listing tools");

        let resp = self
            .client
            .get(format!("{}/tools", self.base_url))
            .header("x-api-key", &self.api_key)
            .query(&params)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let text = resp.text().await?;

        if !(200..300).contains(&status) {
            return Err(ClientError::ApiError { status, body: text });
        }

        serde_json::from_str(&text).map_err(|e| ClientError::Parse(e.to_string()))
    }
}
