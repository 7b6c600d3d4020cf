use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::VoicePlatform;
use crate::error::ClientError;
use crate::types::RegisteredTool;

/// Voice platform client over its `/tool` collection.
pub struct HttpVoicePlatform {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl HttpVoicePlatform {
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

    async fn read_json(resp: reqwest::Response) -> Result<Value, ClientError> {
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        if !(200..300).contains(&status) {
            return Err(ClientError::ApiError { status, body: text });
        }
        serde_json::from_str(&text).map_err(|e| ClientError::Parse(e.to_string()))
    }
}

/// Registry entries keep their name either at the top level or under
/// `function`, depending on the tool type. Entries with neither are skipped.
fn parse_registered(value: &Value) -> Option<RegisteredTool> {
    let id = value["id"].as_str()?.to_string();
    let name = value["name"]
        .as_str()
        .or_else(|| value["function"]["name"].as_str())?
        .to_string();
    let description = value["description"]
        .as_str()
        .or_else(|| value["function"]["description"].as_str())
        .unwrap_or("")
        .to_string();
    let parameters = value
        .get("parameters")
        .or_else(|| value["function"].get("parameters"))
        .cloned()
        .unwrap_or(Value::Null);

    Some(RegisteredTool {
        id,
        name,
        description,
        parameters,
    })
}

#[async_trait]
impl VoicePlatform for HttpVoicePlatform {
    async fn list_tools(&self) -> Result<Vec<RegisteredTool>, ClientError> {
        let resp = self
            .client
            .get(format!("{}/tool", self.base_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let parsed = Self::read_json(resp).await?;

        let raw = parsed
            .as_array()
            .ok_or_else(|| ClientError::Parse("tool registry is not an array".into()))?;
        let tools: Vec<RegisteredTool> = raw.iter().filter_map(parse_registered).collect();
        debug!(count = tools.len(), skipped = raw.len() - tools.len(), "listed registry");
        Ok(tools)
    }

    async fn create_tool(&self, payload: &Value) -> Result<String, ClientError> {
        let resp = self
            .client
            .post(format!("{}/tool", self.base_url))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;
        let parsed = Self::read_json(resp).await?;

        parsed["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| ClientError::Parse("create response has no id".into()))
    }
}
