use std::path::Path;

use anyhow::Context;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

/// Refresh this long before the token actually expires.
const EXPIRY_LEEWAY_SECS: i64 = 60;

/// Identity part of the auth response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Raw body of the backend's token endpoints (sign-up, password grant,
/// id-token grant, refresh).
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<i64>,
    pub user: Option<SessionUser>,
}

/// Claims the client reads out of the backend-issued access token. The
/// signature is the backend's to verify; the client only needs `sub` and
/// `exp`.
#[derive(Debug, Deserialize)]
pub struct AccessClaims {
    pub sub: Uuid,
    pub exp: i64,
    pub email: Option<String>,
}

pub fn decode_claims(token: &str) -> anyhow::Result<AccessClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.set_required_spec_claims::<&str>(&[]);
    let data = decode::<AccessClaims>(token, &DecodingKey::from_secret(&[]), &validation)
        .context("decode access token claims")?;
    Ok(data.claims)
}

/// Authenticated identity context. Lifecycle is owned by the backend; the
/// client holds the tokens, persists them locally, and refreshes when
/// stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(with = "time::serde::timestamp")]
    pub expires_at: OffsetDateTime,
    pub user: SessionUser,
}

impl Session {
    pub fn from_token_response(resp: TokenResponse) -> anyhow::Result<Self> {
        let user = match resp.user {
            Some(user) => user,
            None => {
                let claims = decode_claims(&resp.access_token)?;
                SessionUser {
                    id: claims.sub,
                    email: claims.email,
                }
            }
        };
        let expires_at = match resp.expires_in {
            Some(secs) => OffsetDateTime::now_utc() + Duration::seconds(secs),
            None => OffsetDateTime::from_unix_timestamp(decode_claims(&resp.access_token)?.exp)
                .context("token exp out of range")?,
        };
        debug!(user_id = %user.id, "session established");
        Ok(Self {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            expires_at,
            user,
        })
    }

    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        now + Duration::seconds(EXPIRY_LEEWAY_SECS) >= self.expires_at
    }

    /// Persist to the local session file so later runs stay signed in.
    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("write session file {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Load a previously persisted session. A missing file is not an
    /// error; it just means nobody is signed in.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Option<Self>> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let session: Session = serde_json::from_str(&json)
                    .with_context(|| format!("parse session file {}", path.display()))?;
                Ok(Some(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read session file {}", path.display())),
        }
    }

    pub fn remove_file(path: impl AsRef<Path>) -> anyhow::Result<()> {
        match std::fs::remove_file(path.as_ref()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("remove session file"),
        }
    }
}
