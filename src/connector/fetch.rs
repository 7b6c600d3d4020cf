use std::fmt;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::{ConnectorClient, Page, ToolQuery, ToolScope};
use crate::directory::UserDirectory;
use crate::error::ClientError;
use crate::types::RawTool;

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_MAX_TOOLS: usize = 1000;

/// The ways a toolkit's tools can be listed, in the order they're tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Whole toolkit, unscoped.
    Toolkit,
    /// Scoped to the stored connection id.
    Connection,
    /// Scoped to the user's email from the directory.
    UserEmail,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Toolkit => "toolkit",
            Strategy::Connection => "connection",
            Strategy::UserEmail => "user email",
        })
    }
}

/// Tools from the first strategy that succeeded.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub tools: Vec<RawTool>,
    pub strategy: Strategy,
}

/// Every strategy failed. Holds each strategy's failure in order.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    pub attempts: Vec<(Strategy, String)>,
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .attempts
            .iter()
            .map(|(strategy, message)| format!("{strategy}: {message}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Lists every tool of a toolkit, walking the fallback chain until one
/// strategy answers. Failures of earlier strategies are logged and dropped
/// once a later one succeeds.
pub struct ToolFetcher<'a> {
    client: &'a dyn ConnectorClient,
    directory: &'a dyn UserDirectory,
    page_size: usize,
    max_tools: usize,
}

impl<'a> ToolFetcher<'a> {
    pub fn new(client: &'a dyn ConnectorClient, directory: &'a dyn UserDirectory) -> Self {
        Self {
            client,
            directory,
            page_size: DEFAULT_PAGE_SIZE,
            max_tools: DEFAULT_MAX_TOOLS,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Safety cap on accumulated tools.
    pub fn with_max_tools(mut self, max_tools: usize) -> Self {
        self.max_tools = max_tools;
        self
    }

    pub async fn fetch_all_tools(
        &self,
        toolkit: &str,
        connection_id: &str,
        user_id: &str,
    ) -> Result<FetchOutcome, FetchFailure> {
        let mut attempts = Vec::new();

        match self.fetch_scoped(toolkit, ToolScope::Toolkit).await {
            Ok(tools) => return Ok(self.outcome(toolkit, tools, Strategy::Toolkit)),
            Err(e) => attempts.push(self.failed(toolkit, Strategy::Toolkit, e)),
        }

        match self.fetch_connection(toolkit, connection_id).await {
            Ok(tools) => return Ok(self.outcome(toolkit, tools, Strategy::Connection)),
            Err(e) => attempts.push(self.failed(toolkit, Strategy::Connection, e)),
        }

        match self.fetch_by_email(toolkit, user_id).await {
            Ok(tools) => return Ok(self.outcome(toolkit, tools, Strategy::UserEmail)),
            Err(e) => attempts.push(self.failed(toolkit, Strategy::UserEmail, e)),
        }

        Err(FetchFailure { attempts })
    }

    fn outcome(&self, toolkit: &str, tools: Vec<RawTool>, strategy: Strategy) -> FetchOutcome {
        info!(toolkit, %strategy, count = tools.len(), "fetched tools");
        FetchOutcome { tools, strategy }
    }

    fn failed(&self, toolkit: &str, strategy: Strategy, error: String) -> (Strategy, String) {
        warn!(toolkit, %strategy, error = %error, "fetch strategy failed, trying next");
        (strategy, error)
    }

    /// Paginated listing, then a single unpaginated call if that fails.
    async fn fetch_scoped(&self, toolkit: &str, scope: ToolScope) -> Result<Vec<RawTool>, String> {
        let paged_err = match self.paginate(toolkit, &scope).await {
            Ok(tools) => return Ok(tools),
            Err(e) => e,
        };
        debug!(toolkit, error = %paged_err, "paginated listing failed, retrying without pagination");

        self.fetch_once(toolkit, scope)
            .await
            .map_err(|e| format!("paginated: {paged_err}; unpaginated: {e}"))
    }

    async fn fetch_connection(
        &self,
        toolkit: &str,
        connection_id: &str,
    ) -> Result<Vec<RawTool>, String> {
        if connection_id.trim().is_empty() {
            return Err("no connection id on record".into());
        }
        self.fetch_once(toolkit, ToolScope::Connection(connection_id.to_string()))
            .await
            .map_err(|e| e.to_string())
    }

    async fn fetch_by_email(&self, toolkit: &str, user_id: &str) -> Result<Vec<RawTool>, String> {
        let email = self
            .directory
            .email_for(user_id)
            .await
            .map_err(|e| format!("user lookup failed: {e}"))?
            .ok_or_else(|| format!("no email on record for user {user_id}"))?;
        self.fetch_scoped(toolkit, ToolScope::User(email)).await
    }

    async fn paginate(&self, toolkit: &str, scope: &ToolScope) -> Result<Vec<RawTool>, ClientError> {
        let mut tools = Vec::new();
        let mut offset = 0;
        // Raw items seen, parsed or not. Bounds a service that ignores
        // `offset` and keeps returning full pages of unusable entries.
        let mut received = 0;

        loop {
            let query = ToolQuery {
                toolkit: toolkit.to_string(),
                scope: scope.clone(),
                page: Some(Page {
                    limit: self.page_size,
                    offset,
                }),
            };
            let body = self.client.list_tools(&query).await?;
            let items = unwrap_tool_list(&body)?;
            let returned = items.len();
            if returned == 0 {
                break;
            }

            received += returned;
            tools.extend(items.iter().filter_map(RawTool::from_value));
            if tools.len() >= self.max_tools || received >= self.max_tools {
                warn!(toolkit, cap = self.max_tools, "tool cap reached, stopping pagination");
                tools.truncate(self.max_tools);
                break;
            }
            if returned < self.page_size {
                break;
            }
            offset += returned;
        }

        Ok(tools)
    }

    async fn fetch_once(&self, toolkit: &str, scope: ToolScope) -> Result<Vec<RawTool>, ClientError> {
        let query = ToolQuery {
            toolkit: toolkit.to_string(),
            scope,
            page: None,
        };
        let body = self.client.list_tools(&query).await?;
        let mut tools: Vec<RawTool> = unwrap_tool_list(&body)?
            .iter()
            .filter_map(RawTool::from_value)
            .collect();
        tools.truncate(self.max_tools);
        Ok(tools)
    }
}

/// Find the tool array in a listing response: the body itself, a `data`,
/// `tools` or `items` field, or failing those the first array-valued field.
pub fn unwrap_tool_list(body: &Value) -> Result<&Vec<Value>, ClientError> {
    if let Some(list) = body.as_array() {
        return Ok(list);
    }
    let obj = body
        .as_object()
        .ok_or_else(|| ClientError::Parse("tool listing is neither array nor object".into()))?;

    ["data", "tools", "items"]
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_array))
        .or_else(|| obj.values().find_map(Value::as_array))
        .ok_or_else(|| ClientError::Parse("tool listing has no array field".into()))
}
