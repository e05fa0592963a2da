use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::backend::BackendError;

/// Equality filter in the backend's query syntax, e.g. `id=eq.<uuid>`.
pub fn eq_filter(column: &str, value: impl std::fmt::Display) -> String {
    format!("{}=eq.{}", column, value)
}

/// Row-level table access on the managed backend. All operations are
/// single calls filtered by column equality; no pagination.
#[async_trait]
pub trait TableApi: Send + Sync {
    /// `SELECT *` rows matching `filter`, optionally ordered.
    async fn select(
        &self,
        access_token: &str,
        table: &str,
        filter: &str,
        order: Option<&str>,
    ) -> Result<Value, BackendError>;

    /// Insert one row.
    async fn insert(&self, access_token: &str, table: &str, row: Value)
        -> Result<(), BackendError>;

    /// Patch rows matching `filter`.
    async fn update(
        &self,
        access_token: &str,
        table: &str,
        filter: &str,
        patch: Value,
    ) -> Result<(), BackendError>;
}

pub struct PostgrestClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl PostgrestClient {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    async fn check(
        &self,
        table: &str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%table, status = status.as_u16(), "table request rejected");
            return Err(BackendError::Api(status.as_u16(), detail));
        }
        Ok(response)
    }
}

#[async_trait]
impl TableApi for PostgrestClient {
    async fn select(
        &self,
        access_token: &str,
        table: &str,
        filter: &str,
        order: Option<&str>,
    ) -> Result<Value, BackendError> {
        let mut url = format!("{}?select=*&{}", self.table_url(table), filter);
        if let Some(order) = order {
            url.push_str("&order=");
            url.push_str(order);
        }
        let response = self
            .http
            .get(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let response = self.check(table, response).await?;
        let rows: Value = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        debug!(%table, rows = rows.as_array().map(|a| a.len()).unwrap_or(0), "select");
        Ok(rows)
    }

    async fn insert(
        &self,
        access_token: &str,
        table: &str,
        row: Value,
    ) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.table_url(table))
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(access_token)
            .json(&row)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        self.check(table, response).await?;
        debug!(%table, "insert");
        Ok(())
    }

    async fn update(
        &self,
        access_token: &str,
        table: &str,
        filter: &str,
        patch: Value,
    ) -> Result<(), BackendError> {
        let url = format!("{}?{}", self.table_url(table), filter);
        let response = self
            .http
            .patch(&url)
            .header("apikey", &self.anon_key)
            .header("Prefer", "return=minimal")
            .bearer_auth(access_token)
            .json(&patch)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        self.check(table, response).await?;
        debug!(%table, "update");
        Ok(())
    }
}

#[cfg(test)]
mod filter_tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn eq_filter_uses_backend_syntax() {
        let id = Uuid::nil();
        assert_eq!(
            eq_filter("id", id),
            "id=eq.00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(eq_filter("user_id", "abc"), "user_id=eq.abc");
    }
}
