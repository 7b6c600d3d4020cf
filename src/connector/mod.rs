pub mod fetch;
pub mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ClientError;

pub use fetch::{FetchFailure, FetchOutcome, Strategy, ToolFetcher};
pub use http::HttpConnectorClient;

/// Integration type -> the aggregation service's toolkit code.
const TOOLKITS: &[(&str, &str)] = &[
    ("calendly", "CALENDLY"),
    ("google_calendar", "GOOGLECALENDAR"),
    ("hubspot", "HUBSPOT"),
    ("salesforce", "SALESFORCE"),
    ("cal_com", "CAL"),
    ("gmail", "GMAIL"),
    ("outlook", "OUTLOOK"),
    ("zoho_crm", "ZOHO"),
    ("pipedrive", "PIPEDRIVE"),
];

/// Toolkit code for an integration type. Unmapped types are uppercased.
pub fn toolkit_for(integration_type: &str) -> String {
    let key = integration_type
        .trim()
        .to_lowercase()
        .replace(['-', ' '], "_");
    TOOLKITS
        .iter()
        .find(|(ty, _)| *ty == key)
        .map(|(_, toolkit)| toolkit.to_string())
        .unwrap_or_else(|| integration_type.trim().to_uppercase())
}

/// Who the listing is scoped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolScope {
    /// Every tool in the toolkit.
    Toolkit,
    /// Tools visible to one connected account.
    Connection(String),
    /// Tools visible to a user, keyed by their email.
    User(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

/// One listing request against the aggregation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolQuery {
    pub toolkit: String,
    pub scope: ToolScope,
    /// `None` sends no pagination parameters at all.
    pub page: Option<Page>,
}

/// The aggregation service. One call, one response body. Unwrapping the
/// body into tools happens in the fetch layer, since services wrap their
/// listings differently.
#[async_trait]
pub trait ConnectorClient: Send + Sync {
    async fn list_tools(&self, query: &ToolQuery) -> Result<Value, ClientError>;
}

#[async_trait]
impl ConnectorClient for Box<dyn ConnectorClient> {
    async fn list_tools(&self, query: &ToolQuery) -> Result<Value, ClientError> {
        (**self).list_tools(query).await
    }
}
