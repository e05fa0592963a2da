use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use time::OffsetDateTime;
use tracing::warn;

use crate::backend::auth::{AuthApi, SupabaseAuth};
use crate::backend::postgrest::{PostgrestClient, TableApi};
use crate::backend::session::Session;
use crate::config::AppConfig;
use crate::inference::client::{HttpInference, InferenceApi};

/// Composition root: config plus the three remote client seams. All
/// screen-level code works against the trait objects so tests can swap in
/// fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub inference: Arc<dyn InferenceApi>,
    pub auth: Arc<dyn AuthApi>,
    pub tables: Arc<dyn TableApi>,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let inference = Arc::new(HttpInference::new(&config.inference_url, timeout)?)
            as Arc<dyn InferenceApi>;
        let auth = Arc::new(SupabaseAuth::new(
            &config.backend.url,
            &config.backend.anon_key,
            timeout,
        )?) as Arc<dyn AuthApi>;
        let tables = Arc::new(PostgrestClient::new(
            &config.backend.url,
            &config.backend.anon_key,
            timeout,
        )?) as Arc<dyn TableApi>;

        Ok(Self {
            config,
            inference,
            auth,
            tables,
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        inference: Arc<dyn InferenceApi>,
        auth: Arc<dyn AuthApi>,
        tables: Arc<dyn TableApi>,
    ) -> Self {
        Self {
            config,
            inference,
            auth,
            tables,
        }
    }

    /// Load the persisted session, refreshing it if it has gone stale.
    /// A failed refresh means signed out: the stale file is removed.
    pub async fn restore_session(&self) -> anyhow::Result<Option<Session>> {
        let session = match Session::load(&self.config.session_file)? {
            Some(session) => session,
            None => return Ok(None),
        };
        if !session.is_expired(OffsetDateTime::now_utc()) {
            return Ok(Some(session));
        }
        match self.auth.refresh(&session.refresh_token).await {
            Ok(fresh) => {
                self.persist_session(&fresh)?;
                Ok(Some(fresh))
            }
            Err(e) => {
                warn!(error = %e, "session refresh failed; signing out");
                Session::remove_file(&self.config.session_file)?;
                Ok(None)
            }
        }
    }

    pub fn persist_session(&self, session: &Session) -> anyhow::Result<()> {
        session
            .save(&self.config.session_file)
            .context("persist session")
    }

    pub fn forget_session(&self) -> anyhow::Result<()> {
        Session::remove_file(&self.config.session_file)
    }

    /// Require a signed-in session for a gated action.
    pub async fn require_session(&self) -> anyhow::Result<Session> {
        self.restore_session()
            .await?
            .ok_or_else(|| anyhow::anyhow!("not signed in; run `vinewise signin` first"))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use serde_json::Value;
    use uuid::Uuid;

    use super::*;
    use crate::backend::session::SessionUser;
    use crate::backend::BackendError;
    use crate::inference::client::InferenceError;
    use crate::inference::dto::{PredictionResult, SensorReading};

    pub fn test_config(session_file: &str) -> Arc<AppConfig> {
        Arc::new(AppConfig {
            inference_url: "http://localhost:8000".into(),
            backend: crate::config::BackendConfig {
                url: "http://localhost:54321".into(),
                anon_key: "anon".into(),
            },
            session_file: session_file.into(),
            request_timeout_secs: 5,
        })
    }

    pub fn test_session(user_id: Uuid, expires_at: OffsetDateTime) -> Session {
        Session {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at,
            user: SessionUser {
                id: user_id,
                email: Some("farmer@example.com".into()),
            },
        }
    }

    pub struct StubInference;

    #[async_trait]
    impl InferenceApi for StubInference {
        async fn predict(
            &self,
            _reading: &SensorReading,
        ) -> Result<PredictionResult, InferenceError> {
            Err(InferenceError::Network("stub".into()))
        }
        async fn describe(&self, _result: &PredictionResult) -> Result<String, InferenceError> {
            Err(InferenceError::Network("stub".into()))
        }
    }

    /// Auth fake whose refresh hands back a fixed session (or fails).
    pub struct StubAuth {
        pub refresh_result: Option<Session>,
    }

    #[async_trait]
    impl AuthApi for StubAuth {
        async fn sign_up(
            &self,
            _email: &str,
            _password: &str,
            _metadata: Value,
        ) -> Result<Session, BackendError> {
            Err(BackendError::NotAuthenticated)
        }
        async fn sign_in_password(
            &self,
            _email: &str,
            _password: &str,
        ) -> Result<Session, BackendError> {
            Err(BackendError::NotAuthenticated)
        }
        async fn sign_in_id_token(
            &self,
            _provider: &str,
            _id_token: &str,
        ) -> Result<Session, BackendError> {
            Err(BackendError::NotAuthenticated)
        }
        async fn refresh(&self, _refresh_token: &str) -> Result<Session, BackendError> {
            self.refresh_result
                .clone()
                .ok_or(BackendError::Api(401, "refresh token revoked".into()))
        }
        async fn sign_out(&self, _access_token: &str) -> Result<(), BackendError> {
            Ok(())
        }
    }

    pub struct StubTables;

    #[async_trait]
    impl TableApi for StubTables {
        async fn select(
            &self,
            _access_token: &str,
            _table: &str,
            _filter: &str,
            _order: Option<&str>,
        ) -> Result<Value, BackendError> {
            Ok(Value::Array(vec![]))
        }
        async fn insert(
            &self,
            _access_token: &str,
            _table: &str,
            _row: Value,
        ) -> Result<(), BackendError> {
            Ok(())
        }
        async fn update(
            &self,
            _access_token: &str,
            _table: &str,
            _filter: &str,
            _patch: Value,
        ) -> Result<(), BackendError> {
            Ok(())
        }
    }
}
