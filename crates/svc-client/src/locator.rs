//! Mapping from symbolic endpoint names to request paths.
//!
//! A route such as `self/id` is rendered either as a clean path, `/self/id/`, or, when the
//! server does not rewrite URLs, as a query parameter, `?r=self%2Fid`.
use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::error::{Error, Result};

pub const CONNECT: &str = "connect";
pub const SELF_ID: &str = "selfId";
pub const SELF_LOGIN: &str = "selfLogin";
pub const LOGIN_AS: &str = "loginAs";

/// Table of known locators and the routes they point to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Locators(BTreeMap<String, String>);

impl Default for Locators {
    fn default() -> Self {
        Self::empty()
            .with(CONNECT, "connect")
            .with(SELF_ID, "self/id")
            .with(SELF_LOGIN, "self/login")
            .with(LOGIN_AS, "login-as")
    }
}

impl Locators {
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// Register `route` under `locator`, replacing any previous route.
    pub fn with(mut self, locator: impl Into<String>, route: impl Into<String>) -> Self {
        self.0.insert(locator.into(), route.into());
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn resolve(&self, locator: &str, rewrite: bool) -> Result<String> {
        let route = self
            .0
            .get(locator)
            .ok_or_else(|| Error::UnknownLocator(locator.to_string()))?;
        Ok(render(route, rewrite))
    }
}

fn render(route: &str, rewrite: bool) -> String {
    if rewrite {
        format!("/{route}/")
    } else {
        let encoded: String = form_urlencoded::byte_serialize(route.as_bytes()).collect();
        format!("?r={encoded}")
    }
}
