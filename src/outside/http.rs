use std::{fmt, time::Duration};

use miette::{bail, Context, IntoDiagnostic, Result};
use reqwest::blocking::{Client, RequestBuilder};
use tracing::debug;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Interface for retrieving remote content.
///
/// This is the only place where the network is reached.
pub trait Transport {
    /// GET the URL and return the response body.
    ///
    /// Any non-success status is an error.
    fn get_text(&self, url: &str) -> Result<String>;
}

/// Basic authentication attached to every request.
///
/// Both parts are optional: without any of them, requests are sent unauthenticated.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    username: Option<String>,
    token: Option<String>,
}

impl Credentials {
    /// Empty values are treated as absent
    pub fn new(username: Option<String>, token: Option<String>) -> Self {
        let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
        Self {
            username: non_empty(username),
            token: non_empty(token),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.username.is_none() && self.token.is_none()
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        if self.is_anonymous() {
            request
        } else {
            let username = self.username.as_deref().unwrap_or_default();
            request.basic_auth(username, self.token.as_deref())
        }
    }
}

// Never print the token
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Blocking HTTP client
#[derive(Debug)]
pub struct HttpTransport {
    client: Client,
    credentials: Credentials,
}

impl HttpTransport {
    pub fn new(credentials: Credentials, timeout: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .into_diagnostic()
            .wrap_err("Could not build the HTTP client")?;

        if credentials.is_anonymous() {
            debug!("No credentials given, remote requests are unauthenticated");
        }

        Ok(Self {
            client,
            credentials,
        })
    }

    fn request(&self, url: &str) -> RequestBuilder {
        self.credentials.apply(self.client.get(url))
    }
}

impl Transport for HttpTransport {
    fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {url}");

        let response = self
            .request(url)
            .send()
            .into_diagnostic()
            .wrap_err_with(|| format!("Request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("Request to {url} failed with status {status}");
        }

        response
            .text()
            .into_diagnostic()
            .wrap_err_with(|| format!("Could not read the response of {url}"))
    }
}
