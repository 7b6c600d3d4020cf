use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tenant's linked third-party account, as stored by the connection store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationConnection {
    #[serde(alias = "tenantId")]
    pub tenant_id: String,
    #[serde(alias = "userId")]
    pub user_id: String,
    #[serde(alias = "integrationType")]
    pub integration_type: String,
    #[serde(alias = "connectionId")]
    pub connection_id: String,
    #[serde(alias = "isConnected", default)]
    pub is_connected: bool,
}

/// A tool definition exactly as the connector service returned it.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTool {
    pub name: String,
    pub description: String,
    pub parameter_schema: Value,
}

impl RawTool {
    /// Lift one element of a tool listing. Services disagree on field names,
    /// so the vendor identifier is read from `slug` before `name`, and the
    /// schema from the first of the known schema keys. Elements without an
    /// identifier are rejected.
    pub fn from_value(value: &Value) -> Option<Self> {
        let name = ["slug", "name"]
            .iter()
            .filter_map(|k| value.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())?
            .to_string();

        let description = value
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();

        let parameter_schema = [
            "input_parameters",
            "parameters",
            "parameterSchema",
            "inputSchema",
            "input_schema",
        ]
        .iter()
        .find_map(|k| value.get(*k))
        .cloned()
        .unwrap_or(Value::Null);

        Some(Self {
            name,
            description,
            parameter_schema,
        })
    }
}

/// A filtered tool ready for registration: readable name, vendor name and
/// the converted parameter schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub vendor_name: String,
    pub description: String,
    pub parameters: Value,
}

/// A tool as it exists in the voice platform's registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredTool {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Value,
}

/// What the inbound caller gets back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResult {
    pub tool_ids: Vec<String>,
    pub errors: Vec<String>,
}

/// Per-integration counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IntegrationReport {
    pub integration_type: String,
    pub toolkit: String,
    pub fetched: usize,
    pub allowed: usize,
    pub created: usize,
    pub reused: usize,
    pub duplicates: usize,
    pub error: Option<String>,
}

/// Full account of one sync run.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub tenant_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub integrations: Vec<IntegrationReport>,
    pub tool_ids: Vec<String>,
    pub errors: Vec<String>,
}

impl SyncReport {
    pub fn created(&self) -> usize {
        self.integrations.iter().map(|i| i.created).sum()
    }

    pub fn reused(&self) -> usize {
        self.integrations.iter().map(|i| i.reused).sum()
    }

    pub fn into_result(self) -> SyncResult {
        SyncResult {
            tool_ids: self.tool_ids,
            errors: self.errors,
        }
    }
}
