//! Session state and the rules for how it changes.
//!
//! The token is the only credential sent to the service. The login is remembered solely so
//! that impersonating the user that is already active can skip the round trip; it is never
//! used to decide what the session may access.
use log::debug;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::{
    dispatch::{integer, text, DEFAULT_ERROR_CODE},
    error::{Error, Result},
};

/// Header read by services that authenticate in their own middleware.
pub const AUTHENTICATION: HeaderName = HeaderName::from_static("authentication");
/// Header that survives CGI setups, which strip `Authorization`.
pub const CGI_AUTHORIZATION: HeaderName = HeaderName::from_static("cgi-authorization");

/// Field of successful authentication responses holding the token.
pub const SESSION_ID: &str = "session_id";
/// Impersonation field identifying users by opaque id rather than a login.
pub const ID_FIELD: &str = "id";

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Session {
    token: String,
    login: String,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    pub(crate) fn set_token(&mut self, token: &str, login: &str) -> Result<()> {
        if token.is_empty() {
            return Err(Error::EmptyToken);
        }
        debug!("Using provided token for login {login:?}");
        self.token = token.to_string();
        self.login = login.to_string();
        Ok(())
    }

    pub(crate) fn connected(&mut self, login: &str, token: String) {
        debug!("Connected as {login:?}");
        self.login = login.to_string();
        self.token = token;
    }

    /// Whether impersonating `user` by `field` requires asking the service for a new token.
    pub(crate) fn needs_impersonation(&self, user: &str, field: &str) -> bool {
        field != ID_FIELD && self.login != user
    }

    pub(crate) fn impersonated(&mut self, user: &str, field: &str, token: Option<String>) {
        if let Some(token) = token {
            self.token = token;
        }
        if field == ID_FIELD {
            debug!("Impersonating by id, forgetting login");
            self.login.clear();
        } else {
            debug!("Impersonating {user:?} by {field}");
            self.login = user.to_string();
        }
    }

    /// Headers carrying the token, empty if there is no token.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if self.token.is_empty() {
            return Ok(headers);
        }
        let value = HeaderValue::from_str(&format!("Basic {}", self.token))
            .map_err(|_| Error::InvalidHeader)?;
        headers.insert(AUTHENTICATION, value.clone());
        headers.insert(CGI_AUTHORIZATION, value);
        Ok(headers)
    }
}

/// Extract the token from the result of an authentication request.
pub fn session_id(result: &Value) -> Result<String> {
    match result.get(SESSION_ID).filter(|v| !v.is_null()).map(text) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(Error::AuthenticationFailed {
            message: result
                .get("message")
                .filter(|v| !v.is_null())
                .map_or_else(|| "Undefined message".to_string(), text),
            code: result.get("code").map_or(DEFAULT_ERROR_CODE, integer),
        }),
    }
}
