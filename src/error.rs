#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("Failed to fetch tools for {integration}: {message}")]
    ConnectionFetch { integration: String, message: String },
    #[error("Failed to create tool {name}: {message}")]
    ToolRegistration { name: String, message: String },
    #[error("Failed to load connections: {0}")]
    Connections(ClientError),
    #[error("Failed to load existing tools: {0}")]
    RegistrySnapshot(ClientError),
    #[error("sync cancelled")]
    Cancelled,
}

/// Failure talking to an outbound collaborator (connector service,
/// voice platform, directory).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("API returned {status}: {body}")]
    ApiError { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Request(e.to_string())
    }
}
