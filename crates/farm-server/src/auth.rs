use std::collections::HashSet;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

/// Cookie carrying the session token set by the login flow.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".into(),
        }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Take a bearer token from `Authorization`, falling back to the `token` cookie.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty());
        if let Some(token) = bearer {
            return Self::Bearer(token.to_string());
        }

        let cookie = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
            .map(|(_, value)| value.to_string());
        match cookie {
            Some(token) => Self::Bearer(token),
            None => Self::Anonymous,
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity>;
}

/// Accepts every request.
pub struct AllowAllAuth;

#[async_trait]
impl AuthProvider for AllowAllAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::Bearer(token) => Ok(Identity::user(format!(
                "bearer:{}",
                &token[..8.min(token.len())]
            ))),
            Credentials::Anonymous => Ok(Identity::anonymous()),
        }
    }
}

/// Accepts a fixed set of bearer tokens.
pub struct StaticTokenAuth {
    tokens: HashSet<String>,
}

impl StaticTokenAuth {
    pub fn new(tokens: impl IntoIterator<Item = String>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }
}

#[async_trait]
impl AuthProvider for StaticTokenAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServerResult<Identity> {
        match credentials {
            Credentials::Bearer(token) if self.tokens.contains(token) => Ok(Identity::user(
                format!("token:{}", &token[..4.min(token.len())]),
            )),
            Credentials::Bearer(_) => Err(ServerError::Unauthorized(
                "Not authorized, token failed".into(),
            )),
            Credentials::Anonymous => Err(ServerError::Unauthorized(
                "Not authorized, please login".into(),
            )),
        }
    }
}

/// Middleware for protected routes: authenticates the caller and stores the
/// [`Identity`] in the request extensions.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let credentials = Credentials::from_headers(request.headers());
    let identity = state.auth.authenticate(&credentials).await?;
    tracing::debug!(user = %identity.name, path = %request.uri().path(), "authenticated");
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}
