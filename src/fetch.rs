//! HTTP client for the admin backend
//!
//! Every request carries the stored bearer token. A 401 from any endpoint
//! tears the session down and schedules a redirect to the login page; other
//! failures are handed back to the caller untouched.

use log::{debug, error, warn};
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::config::ClientOptions;
use crate::error::Error;
use crate::events::{AppEvent, EventBus};
use crate::session::SessionController;

/// Error body returned by the backend
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Shared HTTP client bound to one backend
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    client: Client,
    session: SessionController,
    events: EventBus,
    options: ClientOptions,
}

impl ApiClient {
    pub fn new(
        base_url: Url,
        session: SessionController,
        events: EventBus,
        options: ClientOptions,
    ) -> Result<Self, Error> {
        let client = Client::builder().timeout(options.request_timeout).build()?;
        Ok(Self {
            base_url,
            client,
            session,
            events,
            options,
        })
    }

    pub fn session(&self) -> &SessionController {
        &self.session
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Resolve an API path against the base URL
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Create a GET request
    pub fn get(&self, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(self, path, Method::GET)
    }

    /// Create a POST request
    pub fn post(&self, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(self, path, Method::POST)
    }

    /// Create a PATCH request
    pub fn patch(&self, path: &str) -> FetchBuilder<'_> {
        FetchBuilder::new(self, path, Method::PATCH)
    }

    fn handle_unauthorized(&self) {
        if !self.session.invalidate() {
            debug!("401 received with no stored session");
            return;
        }
        warn!("Backend rejected the session, redirecting to login");
        // Gives the caller time to surface its own error before navigating away
        let delay = self.options.unauthorized_redirect_delay;
        let events = self.events.clone();
        let login_path = self.options.login_path.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            events.publish(AppEvent::Navigate(login_path));
        });
    }
}

/// Helper for building and executing HTTP requests
pub struct FetchBuilder<'a> {
    api: &'a ApiClient,
    path: String,
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl<'a> FetchBuilder<'a> {
    fn new(api: &'a ApiClient, path: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            api,
            path: path.to_string(),
            method,
            headers,
            query_params: Vec::new(),
            body: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add a query parameter
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query_params.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, Error> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    fn build(&self) -> Result<RequestBuilder, Error> {
        let mut url = self.api.url(&self.path)?;
        if !self.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                pairs.append_pair(key, value);
            }
        }

        let mut headers = self.headers.clone();
        if let Some(token) = self.api.session.token() {
            if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, value);
            }
        }

        let mut req = self.api.client.request(self.method.clone(), url).headers(headers);
        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }
        Ok(req)
    }

    /// Send the request and return the successful response
    pub async fn send(&self) -> Result<Response, Error> {
        let req = self.build()?;
        debug!("{} {}", self.method, self.path);

        let response = match req.send().await {
            Ok(response) => response,
            Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                error!("Could not reach the server ({} {}): {}", self.method, self.path, e);
                return Err(Error::Connection(e.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.api.handle_unauthorized();
            return Err(Error::Unauthorized);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|body| body.message);
            if let Some(message) = &message {
                error!("Server error on {} {}: {}", self.method, self.path, message);
            }
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let response = self.send().await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Execute the request and discard the response body
    pub async fn execute_empty(&self) -> Result<(), Error> {
        self.send().await?;
        Ok(())
    }
}
