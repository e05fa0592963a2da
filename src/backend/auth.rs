use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::backend::session::{Session, TokenResponse};
use crate::backend::BackendError;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub const MIN_PASSWORD_LEN: usize = 8;

/// Auth service of the managed backend. Session lifecycle is owned by the
/// backend; the client only exchanges credentials and tokens.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Email/password registration. `metadata` is the profile seed stored
    /// with the new auth user.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<Session, BackendError>;

    async fn sign_in_password(&self, email: &str, password: &str)
        -> Result<Session, BackendError>;

    /// OAuth sign-in by exchanging a provider-issued id token.
    async fn sign_in_id_token(
        &self,
        provider: &str,
        id_token: &str,
    ) -> Result<Session, BackendError>;

    async fn refresh(&self, refresh_token: &str) -> Result<Session, BackendError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;
}

fn signup_body(email: &str, password: &str, metadata: Value) -> Value {
    json!({ "email": email, "password": password, "data": metadata })
}

fn password_grant_body(email: &str, password: &str) -> Value {
    json!({ "email": email, "password": password })
}

fn id_token_grant_body(provider: &str, id_token: &str) -> Value {
    json!({ "provider": provider, "id_token": id_token })
}

fn refresh_grant_body(refresh_token: &str) -> Value {
    json!({ "refresh_token": refresh_token })
}

pub struct SupabaseAuth {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseAuth {
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

    async fn token_request(&self, path: &str, body: Value) -> Result<Session, BackendError> {
        let url = format!("{}/auth/v1{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "auth request rejected");
            return Err(BackendError::Api(status.as_u16(), detail));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        Session::from_token_response(token).map_err(|e| BackendError::Parse(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for SupabaseAuth {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: Value,
    ) -> Result<Session, BackendError> {
        debug!(%email, "sign-up");
        self.token_request("/signup", signup_body(email, password, metadata))
            .await
    }

    async fn sign_in_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, BackendError> {
        debug!(%email, "password sign-in");
        self.token_request(
            "/token?grant_type=password",
            password_grant_body(email, password),
        )
        .await
    }

    async fn sign_in_id_token(
        &self,
        provider: &str,
        id_token: &str,
    ) -> Result<Session, BackendError> {
        debug!(%provider, "id-token sign-in");
        self.token_request(
            "/token?grant_type=id_token",
            id_token_grant_body(provider, id_token),
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, BackendError> {
        debug!("refreshing session");
        self.token_request(
            "/token?grant_type=refresh_token",
            refresh_grant_body(refresh_token),
        )
        .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let url = format!("{}/auth/v1/logout", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(BackendError::Api(status.as_u16(), detail));
        }
        Ok(())
    }
}
