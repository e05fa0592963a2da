use thiserror::Error;

pub mod auth;
pub mod postgrest;
pub mod session;

/// Managed-backend client errors, shared by the auth and table clients.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend API error {0}: {1}")]
    Api(u16, String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("not signed in")]
    NotAuthenticated,
}
