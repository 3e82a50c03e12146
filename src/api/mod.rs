//! HTTP transport with an explicit authorization pipeline.
//!
//! Every request the console sends goes through one [`Transport`], which
//! composes an ordered list of [`Middleware`] around a shared
//! `reqwest::Client`. Token attachment always happens before the request
//! leaves the client; the forced-logout side effect of a 401 always happens
//! before the error is returned to the caller.

pub mod authorize;
pub mod error;

pub use authorize::{BearerAuth, Middleware, SessionExpiry};
pub use error::ApiError;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, Instrument, info_span};
use url::Url;

use crate::APP_USER_AGENT;

pub struct Transport {
    client: Client,
    base_url: String,
    middlewares: Vec<Arc<dyn Middleware>>,
}

fn api_error_message(status: StatusCode, body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

impl Transport {
    /// Build the transport. `base_url` must be an absolute http(s) URL; a
    /// trailing slash is ignored. Requests time out after `timeout`; an
    /// unresponsive backend errors out instead of hanging forever.
    ///
    /// # Errors
    /// Returns an error if `base_url` does not parse or the HTTP client
    /// cannot be built.
    pub fn new(
        base_url: &str,
        timeout: Duration,
        middlewares: Vec<Arc<dyn Middleware>>,
    ) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url)?;
        let base_url = parsed.as_str().trim_end_matches('/').to_string();

        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            middlewares,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.endpoint(path);

        let mut builder = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let mut request = builder.build()?;

        for middleware in &self.middlewares {
            middleware.on_request(&mut request);
        }

        let span = info_span!(
            "api.request",
            http.method = %method,
            url = %url
        );
        let response = self.client.execute(request).instrument(span).await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = api_error_message(status, &body);
        debug!("request to {url} failed: {status} {message}");

        // Side effects (forced logout on 401) run before the caller can
        // observe the error.
        for middleware in &self.middlewares {
            middleware.on_error_status(status);
        }

        Err(ApiError::Status {
            url,
            status,
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// # Errors
    /// Returns an error on transport failure, error status, or an
    /// undecodable body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute::<()>(Method::GET, path, None).await?;
        Self::decode(response).await
    }

    /// # Errors
    /// Returns an error on transport failure, error status, or an
    /// undecodable body.
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.execute(Method::POST, path, Some(body)).await?;
        Self::decode(response).await
    }

    /// # Errors
    /// Returns an error on transport failure, error status, or an
    /// undecodable body.
    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.execute(Method::PUT, path, Some(body)).await?;
        Self::decode(response).await
    }
}
