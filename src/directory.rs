use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::types::IntegrationConnection;

/// Where a tenant's linked integrations are recorded.
#[async_trait]
pub trait ConnectionStore: Send + Sync {
    async fn connections(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> Result<Vec<IntegrationConnection>, ClientError>;
}

/// Resolves a user id to the email the connector service knows them by.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// `Ok(None)` if the user exists but has no email on record.
    async fn email_for(&self, user_id: &str) -> Result<Option<String>, ClientError>;
}

#[async_trait]
impl ConnectionStore for Box<dyn ConnectionStore> {
    async fn connections(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> Result<Vec<IntegrationConnection>, ClientError> {
        (**self).connections(tenant_id, user_id).await
    }
}

#[async_trait]
impl UserDirectory for Box<dyn UserDirectory> {
    async fn email_for(&self, user_id: &str) -> Result<Option<String>, ClientError> {
        (**self).email_for(user_id).await
    }
}

/// Both collaborators over one REST backend: a PostgREST-style table of
/// connections and an admin users endpoint.
pub struct RestDirectory {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
    table: String,
}

impl RestDirectory {
    pub fn new(base_url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, service_key)
    }

    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service_key: service_key.into(),
            table: "integrations".into(),
        }
    }

    /// Table holding connection rows. Defaults to `integrations`.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    async fn get(&self, url: String, query: &[(&str, String)]) -> Result<Value, ClientError> {
        let resp = self
            .client
            .get(url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .query(query)
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

#[derive(Deserialize)]
struct UserRecord {
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl ConnectionStore for RestDirectory {
    async fn connections(
        &self,
        tenant_id: &str,
        user_id: &str,
    ) -> Result<Vec<IntegrationConnection>, ClientError> {
        let url = format!("{}/rest/v1/{}", self.base_url, self.table);
        let query = [
            ("select", "*".to_string()),
            ("tenant_id", format!("eq.{tenant_id}")),
            ("user_id", format!("eq.{user_id}")),
        ];
        let body = self.get(url, &query).await?;
        let rows: Vec<IntegrationConnection> =
            serde_json::from_value(body).map_err(|e| ClientError::Parse(e.to_string()))?;
        debug!(tenant = tenant_id, rows = rows.len(), "loaded connections");
        Ok(rows)
    }
}

#[async_trait]
impl UserDirectory for RestDirectory {
    async fn email_for(&self, user_id: &str) -> Result<Option<String>, ClientError> {
        let url = format!("{}/auth/v1/admin/users/{}", self.base_url, user_id);
        let body = self.get(url, &[]).await?;
        let record: UserRecord =
            serde_json::from_value(body).map_err(|e| ClientError::Parse(e.to_string()))?;
        Ok(record.email.filter(|e| !e.trim().is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::HeaderMap;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/rest/v1/integrations",
                get(
                    |headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                        assert_eq!(headers["apikey"], "svc-key");
                        assert_eq!(q["tenant_id"], "eq.t1");
                        Json(json!([
                            {
                                "tenant_id": "t1", "user_id": "u1",
                                "integration_type": "calendly",
                                "connection_id": "ca_1", "is_connected": true
                            },
                            {
                                "tenant_id": "t1", "user_id": "u1",
                                "integration_type": "hubspot",
                                "connection_id": "ca_2", "is_connected": false
                            }
                        ]))
                    },
                ),
            )
            .route(
                "/auth/v1/admin/users/{id}",
                get(|Path(id): Path<String>| async move {
                    match id.as_str() {
                        "u1" => Json(json!({"id": "u1", "email": "owner@example.com"})),
                        _ => Json(json!({"id": id, "email": ""})),
                    }
                }),
            )
    }

    #[tokio::test]
    async fn loads_connection_rows() {
        let base = serve(app()).await;
        let dir = RestDirectory::new(format!("{base}/"), "svc-key");
        let rows = dir.connections("t1", "u1").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].integration_type, "calendly");
        assert!(!rows[1].is_connected);
    }

    #[tokio::test]
    async fn resolves_email() {
        let base = serve(app()).await;
        let dir = RestDirectory::new(base, "svc-key");
        assert_eq!(
            dir.email_for("u1").await.unwrap().as_deref(),
            Some("owner@example.com")
        );
        assert_eq!(dir.email_for("u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn api_errors_carry_status() {
        let base = serve(Router::new()).await;
        let dir = RestDirectory::new(base, "svc-key");
        match dir.connections("t1", "u1").await {
            Err(ClientError::ApiError { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected ApiError, got {other:?}"),
        }
    }
}
