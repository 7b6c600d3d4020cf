pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientError;
use crate::types::RegisteredTool;

pub use http::HttpVoicePlatform;

/// The voice-agent platform's tool registry.
#[async_trait]
pub trait VoicePlatform: Send + Sync {
    /// Every tool currently registered.
    async fn list_tools(&self) -> Result<Vec<RegisteredTool>, ClientError>;

    /// Register a tool from a complete payload. Returns the new tool's id.
    async fn create_tool(&self, payload: &Value) -> Result<String, ClientError>;
}

#[async_trait]
impl VoicePlatform for Box<dyn VoicePlatform> {
    async fn list_tools(&self) -> Result<Vec<RegisteredTool>, ClientError> {
        (**self).list_tools().await
    }

    async fn create_tool(&self, payload: &Value) -> Result<String, ClientError> {
        (**self).create_tool(payload).await
    }
}
