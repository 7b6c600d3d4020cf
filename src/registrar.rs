use std::collections::{HashMap, HashSet};

use serde_json::{json, Value};
use tracing::{debug, info};

use crate::error::{ClientError, SyncError};
use crate::naming::{to_canonical, to_platform_safe_name};
use crate::platform::VoicePlatform;
use crate::schema::convert_schema;
use crate::types::{RegisteredTool, ToolDescriptor};

/// Path on the deployment site that dispatches live tool calls.
pub const DISPATCH_PATH: &str = "/api/voice/tool-call";

/// How long the platform waits on the dispatch endpoint.
pub const WEBHOOK_TIMEOUT_SECS: u64 = 30;

/// Where registered tools send their calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub url: String,
}

impl WebhookTarget {
    pub fn from_site_url(site_url: &str) -> Self {
        Self {
            url: format!("{}{}", site_url.trim_end_matches('/'), DISPATCH_PATH),
        }
    }
}

/// What `register` did with a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Created(String),
    /// Already in the registry before the run; no creation call made.
    Reused(String),
    /// Same platform-safe name as an earlier candidate in this run. Dropped.
    Duplicate,
}

impl Registration {
    pub fn id(&self) -> Option<&str> {
        match self {
            Registration::Created(id) | Registration::Reused(id) => Some(id),
            Registration::Duplicate => None,
        }
    }
}

/// Webhook tool payload. `connectionId` and `toolName` are fixed values the
/// agent can't change; only `parameters` is filled in at call time.
pub fn webhook_payload(
    descriptor: &ToolDescriptor,
    safe_name: &str,
    connection_id: &str,
    target: &WebhookTarget,
) -> Value {
    let mut parameters = if descriptor.parameters.is_object() {
        descriptor.parameters.clone()
    } else {
        convert_schema(&descriptor.parameters)
    };
    parameters["description"] = Value::String(format!("Arguments for {}", descriptor.name));

    json!({
        "type": "apiRequest",
        "name": safe_name,
        "description": descriptor.description,
        "method": "POST",
        "url": target.url,
        "timeoutSeconds": WEBHOOK_TIMEOUT_SECS,
        "headers": {
            "type": "object",
            "properties": {
                "Content-Type": {"type": "string", "value": "application/json"}
            }
        },
        "body": {
            "type": "object",
            "properties": {
                "connectionId": {
                    "type": "string",
                    "description": "Connected account the call runs under",
                    "value": connection_id
                },
                "toolName": {
                    "type": "string",
                    "description": "Connector action to execute",
                    "value": descriptor.vendor_name
                },
                "parameters": parameters
            },
            "required": ["parameters"]
        }
    })
}

/// Idempotent registration against one snapshot of the platform registry.
///
/// Names are compared on the canonical form of their platform-safe name, so
/// `List_Events`, `list-events` and `LIST EVENTS` are one tool. The
/// snapshot is taken once; a concurrent run against the same registry may
/// still create the same name twice.
pub struct ToolRegistrar {
    target: WebhookTarget,
    existing: HashMap<String, String>,
    seen: HashSet<String>,
}

impl ToolRegistrar {
    pub fn new(existing: &[RegisteredTool], target: WebhookTarget) -> Self {
        let mut index = HashMap::new();
        for tool in existing {
            index
                .entry(to_canonical(&tool.name))
                .or_insert_with(|| tool.id.clone());
        }
        Self {
            target,
            existing: index,
            seen: HashSet::new(),
        }
    }

    /// Fetch the full registry and index it.
    pub async fn snapshot(
        platform: &dyn VoicePlatform,
        target: WebhookTarget,
    ) -> Result<Self, ClientError> {
        let existing = platform.list_tools().await?;
        info!(count = existing.len(), "loaded existing tool registry");
        Ok(Self::new(&existing, target))
    }

    pub fn existing_len(&self) -> usize {
        self.existing.len()
    }

    pub async fn register(
        &mut self,
        platform: &dyn VoicePlatform,
        descriptor: &ToolDescriptor,
        connection_id: &str,
    ) -> Result<Registration, SyncError> {
        let safe_name = to_platform_safe_name(&descriptor.name);
        let key = to_canonical(&safe_name);
        if key.is_empty() {
            return Err(SyncError::ToolRegistration {
                name: descriptor.vendor_name.clone(),
                message: "name has no characters the platform accepts".into(),
            });
        }

        if !self.seen.insert(key.clone()) {
            debug!(tool = %safe_name, vendor = %descriptor.vendor_name, "duplicate in run, skipping");
            return Ok(Registration::Duplicate);
        }

        if let Some(id) = self.existing.get(&key) {
            debug!(tool = %safe_name, id = %id, "reusing registered tool");
            return Ok(Registration::Reused(id.clone()));
        }

        let payload = webhook_payload(descriptor, &safe_name, connection_id, &self.target);
        match platform.create_tool(&payload).await {
            Ok(id) => {
                info!(tool = %safe_name, id = %id, "created tool");
                Ok(Registration::Created(id))
            }
            Err(e) => Err(SyncError::ToolRegistration {
                name: safe_name,
                message: e.to_string(),
            }),
        }
    }
}
