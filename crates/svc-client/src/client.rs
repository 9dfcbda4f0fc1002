use log::debug;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method,
};
use serde_json::{json, Value};
use url::Url;

use crate::{
    dispatch::{dispatch, field_or_whole},
    error::{Error, Result},
    locator::{Locators, CONNECT, LOGIN_AS, SELF_ID, SELF_LOGIN},
    resolver::Resolver,
    session::{session_id, Session},
    transport::Transport,
};

fn is_url(s: &str) -> bool {
    Url::parse(s).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

pub struct ClientBuilder {
    service: String,
    headers: HeaderMap,
    locators: Locators,
    rewrite: bool,
    credentials: Option<(String, String)>,
}

impl ClientBuilder {
    /// Start building a client for `service`, which is either a name or a URL.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            headers: HeaderMap::new(),
            locators: Locators::default(),
            rewrite: true,
            credentials: None,
        }
    }

    /// Send `value` as `name` with every request.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn locators(mut self, locators: Locators) -> Self {
        self.locators = locators;
        self
    }

    pub fn rewrite_mode(mut self, rewrite: bool) -> Self {
        self.rewrite = rewrite;
        self
    }

    /// Connect as soon as the client is built.
    ///
    /// An empty login means no connection is attempted.
    pub fn credentials(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some((login.into(), password.into()));
        self
    }

    /// # Errors
    ///
    /// Fails with [`Error::ServiceNotFound`] if `resolver` does not know the service and the
    /// service is not a URL, and with any error from [`Client::connect`] if credentials were
    /// given.
    pub fn build<T: Transport>(self, resolver: &impl Resolver, transport: T) -> Result<Client<T>> {
        let Self {
            service,
            headers,
            locators,
            rewrite,
            credentials,
        } = self;
        let (service, base_url) = match resolver.resolve(&service) {
            Some(url) => {
                debug!("Resolved service {service} to {url}");
                (service, url)
            }
            None if is_url(&service) => (String::new(), service),
            None => return Err(Error::ServiceNotFound(service)),
        };
        let mut client = Client {
            service,
            base_url,
            rewrite,
            locators,
            headers,
            session: Session::default(),
            transport,
        };
        if let Some((login, password)) = credentials {
            if !login.is_empty() {
                client.connect(&login, &password)?;
            }
        }
        Ok(client)
    }
}

/// A client that keeps a session with one service.
///
/// The session is plain mutable state; share a client between threads only behind a lock.
pub struct Client<T> {
    service: String,
    base_url: String,
    rewrite: bool,
    locators: Locators,
    headers: HeaderMap,
    session: Session,
    transport: T,
}

impl<T: Transport> Client<T> {
    pub fn new(service: impl Into<String>, resolver: &impl Resolver, transport: T) -> Result<Self> {
        ClientBuilder::new(service).build(resolver, transport)
    }

    /// Name of the service as known to the resolver, empty if the client was created from a URL.
    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_rewrite_mode(&mut self, rewrite: bool) {
        self.rewrite = rewrite;
    }

    pub fn rewrite_mode(&self) -> bool {
        self.rewrite
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn token(&self) -> &str {
        self.session.token()
    }

    /// The login most recently authenticated, used only to avoid redundant impersonation.
    pub fn stored_login(&self) -> &str {
        self.session.login()
    }

    pub fn get_request_url(&self, locator: &str) -> Result<String> {
        self.locators.resolve(locator, self.rewrite)
    }

    /// Authenticate with a login and password, replacing the current session on success.
    pub fn connect(&mut self, login: &str, password: &str) -> Result<()> {
        let endpoint = self.get_request_url(CONNECT)?;
        let result = self.post(
            &endpoint,
            &json!({
                "login": login,
                "password": password,
            }),
        )?;
        let token = session_id(&result)?;
        self.session.connected(login, token);
        Ok(())
    }

    /// Use a token obtained elsewhere.
    ///
    /// The token is not validated until it is used.
    pub fn set_token(&mut self, token: &str, login: &str) -> Result<()> {
        self.session.set_token(token, login)
    }

    /// Act as another user.
    ///
    /// When `field` is `"id"` the service is not contacted and the stored login is forgotten.
    /// Otherwise a new token is requested unless `user` is already the stored login.
    pub fn login_as(&mut self, user: &str, field: &str) -> Result<()> {
        let token = if self.session.needs_impersonation(user, field) {
            let endpoint = self.get_request_url(LOGIN_AS)?;
            let mut data = serde_json::Map::new();
            data.insert(field.to_string(), Value::from(user));
            let result = self.post(&endpoint, &Value::Object(data))?;
            Some(session_id(&result)?)
        } else {
            debug!("Already acting as {user:?}, skipping impersonation request");
            None
        };
        self.session.impersonated(user, field, token);
        Ok(())
    }

    pub fn self_id(&self) -> Result<String> {
        let endpoint = self.get_request_url(SELF_ID)?;
        Ok(field_or_whole(&self.get(&endpoint)?, "id"))
    }

    pub fn self_login(&self) -> Result<String> {
        let endpoint = self.get_request_url(SELF_LOGIN)?;
        Ok(field_or_whole(&self.get(&endpoint)?, "login"))
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = self.headers.clone();
        headers.extend(self.session.headers()?);
        Ok(headers)
    }

    pub fn get(&self, endpoint: &str) -> Result<Value> {
        self.request(Method::GET, endpoint, None)
    }

    pub fn post(&self, endpoint: &str, data: &Value) -> Result<Value> {
        self.request(Method::POST, endpoint, Some(data))
    }

    pub fn put(&self, endpoint: &str, data: &Value) -> Result<Value> {
        self.request(Method::PUT, endpoint, Some(data))
    }

    pub fn delete(&self, endpoint: &str, data: &Value) -> Result<Value> {
        self.request(Method::DELETE, endpoint, Some(data))
    }

    /// Send a request to `endpoint`, relative to the base URL, and dispatch the response.
    pub fn request(&self, method: Method, endpoint: &str, data: Option<&Value>) -> Result<Value> {
        let url = self.url(endpoint);
        let headers = self.headers()?;
        let (status, body) = self.transport.send(method, &url, &headers, data)?;
        dispatch(&url, status, &body)
    }

    fn url(&self, endpoint: &str) -> String {
        let base = if endpoint.starts_with('/') {
            self.base_url.strip_suffix('/').unwrap_or(&self.base_url)
        } else {
            &self.base_url
        };
        format!("{base}{endpoint}")
    }
}
