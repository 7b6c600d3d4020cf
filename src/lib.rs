pub mod allowlist;
pub mod config;
pub mod connector;
pub mod directory;
pub mod error;
pub mod events;
pub mod naming;
pub mod platform;
pub mod registrar;
pub mod schema;
#[cfg(feature = "server")]
pub mod server;
pub mod types;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub use allowlist::{AllowList, MatchTier};
pub use config::Settings;
pub use connector::{toolkit_for, ConnectorClient, HttpConnectorClient, ToolFetcher};
pub use directory::{ConnectionStore, RestDirectory, UserDirectory};
pub use error::{ClientError, SyncError};
pub use events::SyncEvent;
pub use naming::{to_canonical, to_platform_safe_name, to_readable};
pub use platform::{HttpVoicePlatform, VoicePlatform};
pub use registrar::{Registration, ToolRegistrar, WebhookTarget};
pub use schema::{convert_property, convert_schema};
pub use types::{
    IntegrationConnection, IntegrationReport, RawTool, RegisteredTool, SyncReport, SyncResult,
    ToolDescriptor,
};

use connector::fetch::{DEFAULT_MAX_TOOLS, DEFAULT_PAGE_SIZE};

/// Engine knobs.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub page_size: usize,
    pub max_tools: usize,
    pub webhook: WebhookTarget,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_tools: DEFAULT_MAX_TOOLS,
            webhook: WebhookTarget::from_site_url("http://localhost:3000"),
        }
    }
}

impl SyncConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            page_size: settings.page_size,
            max_tools: settings.max_tools,
            webhook: WebhookTarget::from_site_url(&settings.site_url),
        }
    }
}

/// The sync engine. Wire up the four collaborators and run it per
/// tenant and user.
///
/// Integrations and tools are processed one at a time. A failure in one
/// integration or one tool is recorded and the run moves on; a run always
/// ends with a result.
pub struct ToolSync {
    connections: Box<dyn ConnectionStore>,
    connector: Box<dyn ConnectorClient>,
    directory: Box<dyn UserDirectory>,
    platform: Box<dyn VoicePlatform>,
    allow_list: AllowList,
    config: SyncConfig,
}

impl ToolSync {
    pub fn new(
        connections: impl ConnectionStore + 'static,
        connector: impl ConnectorClient + 'static,
        directory: impl UserDirectory + 'static,
        platform: impl VoicePlatform + 'static,
        config: SyncConfig,
    ) -> Self {
        Self {
            connections: Box::new(connections),
            connector: Box::new(connector),
            directory: Box::new(directory),
            platform: Box::new(platform),
            allow_list: AllowList::builtin(),
            config,
        }
    }

    /// HTTP collaborators built from settings, sharing one client.
    pub fn from_settings(settings: &Settings) -> Result<Self, SyncError> {
        let client = settings.http_client()?;
        let directory = |c: reqwest::Client| {
            RestDirectory::with_client(c, &settings.directory_url, &settings.directory_service_key)
        };

        Ok(Self::new(
            directory(client.clone()),
            HttpConnectorClient::with_client(
                client.clone(),
                &settings.connector_base_url,
                &settings.connector_api_key,
            ),
            directory(client.clone()),
            HttpVoicePlatform::with_client(client, &settings.voice_base_url, &settings.voice_api_key),
            SyncConfig::from_settings(settings),
        ))
    }

    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    pub async fn sync(&self, tenant_id: &str, user_id: &str) -> SyncResult {
        self.run(tenant_id, user_id, None, None).await.into_result()
    }

    /// Like `sync`, with per-integration counters and timestamps.
    pub async fn sync_report(&self, tenant_id: &str, user_id: &str) -> SyncReport {
        self.run(tenant_id, user_id, None, None).await
    }

    /// Sync with cancellation, checked before each integration. A cancelled
    /// run returns what it registered so far.
    pub async fn sync_with_cancel(
        &self,
        tenant_id: &str,
        user_id: &str,
        cancel: CancellationToken,
    ) -> SyncResult {
        self.run(tenant_id, user_id, Some(&cancel), None)
            .await
            .into_result()
    }

    /// Sync with progress events.
    pub async fn sync_streaming(
        &self,
        tenant_id: &str,
        user_id: &str,
        tx: mpsc::Sender<SyncEvent>,
    ) -> SyncResult {
        self.run(tenant_id, user_id, None, Some(&tx))
            .await
            .into_result()
    }

    async fn run(
        &self,
        tenant_id: &str,
        user_id: &str,
        cancel: Option<&CancellationToken>,
        tx: Option<&mpsc::Sender<SyncEvent>>,
    ) -> SyncReport {
        let mut report = SyncReport {
            tenant_id: tenant_id.to_string(),
            user_id: user_id.to_string(),
            started_at: Utc::now(),
            finished_at: Utc::now(),
            integrations: Vec::new(),
            tool_ids: Vec::new(),
            errors: Vec::new(),
        };

        info!(tenant = tenant_id, user = user_id, "tool sync started");

        let connections = match self.connections.connections(tenant_id, user_id).await {
            Ok(connections) => connections,
            Err(e) => {
                record(&mut report, SyncError::Connections(e));
                return finish(report, tx).await;
            }
        };

        let total = connections.len();
        let connected: Vec<IntegrationConnection> =
            connections.into_iter().filter(|c| c.is_connected).collect();
        if connected.len() < total {
            debug!(skipped = total - connected.len(), "skipping disconnected integrations");
        }
        if connected.is_empty() {
            info!(tenant = tenant_id, "no connected integrations");
            return finish(report, tx).await;
        }

        let mut registrar =
            match ToolRegistrar::snapshot(&*self.platform, self.config.webhook.clone()).await {
                Ok(registrar) => registrar,
                Err(e) => {
                    record(&mut report, SyncError::RegistrySnapshot(e));
                    return finish(report, tx).await;
                }
            };

        let fetcher = ToolFetcher::new(&*self.connector, &*self.directory)
            .with_page_size(self.config.page_size)
            .with_max_tools(self.config.max_tools);

        for connection in &connected {
            if cancel.is_some_and(|c| c.is_cancelled()) {
                info!(tenant = tenant_id, "tool sync cancelled");
                record(&mut report, SyncError::Cancelled);
                break;
            }

            let integration = self
                .sync_integration(connection, user_id, &fetcher, &mut registrar, &mut report, tx)
                .await;
            report.integrations.push(integration);
        }

        finish(report, tx).await
    }

    async fn sync_integration(
        &self,
        connection: &IntegrationConnection,
        user_id: &str,
        fetcher: &ToolFetcher<'_>,
        registrar: &mut ToolRegistrar,
        report: &mut SyncReport,
        tx: Option<&mpsc::Sender<SyncEvent>>,
    ) -> IntegrationReport {
        let integration_type = connection.integration_type.as_str();
        let toolkit = toolkit_for(integration_type);
        let mut summary = IntegrationReport {
            integration_type: integration_type.to_string(),
            toolkit: toolkit.clone(),
            ..Default::default()
        };

        emit(
            tx,
            SyncEvent::IntegrationStarted {
                integration_type: integration_type.to_string(),
                toolkit: toolkit.clone(),
            },
        )
        .await;

        let outcome = match fetcher
            .fetch_all_tools(&toolkit, &connection.connection_id, user_id)
            .await
        {
            Ok(outcome) => outcome,
            Err(failure) => {
                let err = SyncError::ConnectionFetch {
                    integration: integration_type.to_string(),
                    message: failure.to_string(),
                };
                let message = err.to_string();
                emit(
                    tx,
                    SyncEvent::IntegrationFailed {
                        integration_type: integration_type.to_string(),
                        message: message.clone(),
                    },
                )
                .await;
                summary.error = Some(message);
                record(report, err);
                return summary;
            }
        };

        summary.fetched = outcome.tools.len();
        emit(
            tx,
            SyncEvent::ToolsFetched {
                integration_type: integration_type.to_string(),
                count: summary.fetched,
                strategy: outcome.strategy,
            },
        )
        .await;

        for raw in &outcome.tools {
            let Some(tier) = self.allow_list.match_tier(&raw.name, integration_type) else {
                debug!(tool = %raw.name, integration = integration_type, "not on allow-list");
                emit(tx, SyncEvent::ToolRejected { name: raw.name.clone() }).await;
                continue;
            };
            summary.allowed += 1;
            emit(
                tx,
                SyncEvent::ToolAllowed {
                    name: raw.name.clone(),
                    tier,
                },
            )
            .await;

            let descriptor = describe(raw);
            match registrar
                .register(&*self.platform, &descriptor, &connection.connection_id)
                .await
            {
                Ok(Registration::Created(id)) => {
                    summary.created += 1;
                    emit(
                        tx,
                        SyncEvent::ToolCreated {
                            name: descriptor.name,
                            id: id.clone(),
                        },
                    )
                    .await;
                    report.tool_ids.push(id);
                }
                Ok(Registration::Reused(id)) => {
                    summary.reused += 1;
                    emit(
                        tx,
                        SyncEvent::ToolReused {
                            name: descriptor.name,
                            id: id.clone(),
                        },
                    )
                    .await;
                    report.tool_ids.push(id);
                }
                Ok(Registration::Duplicate) => {
                    summary.duplicates += 1;
                    emit(tx, SyncEvent::ToolDuplicate { name: descriptor.name }).await;
                }
                Err(e) => record(report, e),
            }
        }

        info!(
            integration = integration_type,
            fetched = summary.fetched,
            allowed = summary.allowed,
            created = summary.created,
            reused = summary.reused,
            "integration synced"
        );
        summary
    }
}

/// Readable name, non-empty description, converted parameters.
fn describe(raw: &RawTool) -> ToolDescriptor {
    let name = to_readable(&raw.name);
    let description = if raw.description.is_empty() {
        name.clone()
    } else {
        raw.description.clone()
    };
    ToolDescriptor {
        name,
        vendor_name: raw.name.clone(),
        description,
        parameters: convert_schema(&raw.parameter_schema),
    }
}

fn record(report: &mut SyncReport, err: SyncError) {
    warn!(error = %err, "sync error recorded");
    report.errors.push(err.to_string());
}

async fn emit(tx: Option<&mpsc::Sender<SyncEvent>>, event: SyncEvent) {
    if let Some(tx) = tx {
        let _ = tx.send(event).await;
    }
}

async fn finish(mut report: SyncReport, tx: Option<&mpsc::Sender<SyncEvent>>) -> SyncReport {
    report.finished_at = Utc::now();
    info!(
        tenant = %report.tenant_id,
        tools = report.tool_ids.len(),
        created = report.created(),
        reused = report.reused(),
        errors = report.errors.len(),
        "tool sync finished"
    );
    emit(
        tx,
        SyncEvent::Finished {
            tool_ids: report.tool_ids.len(),
            errors: report.errors.len(),
        },
    )
    .await;
    report
}
