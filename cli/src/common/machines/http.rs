//! # devm Control-Plane HTTP Client (`common::machines::http`)
//!
//! File: cli/src/common/machines/http.rs
//! Repository: https://github.com/devm-cli/devm
//!
//! ## Overview
//!
//! Concrete `RemoteTransport` implementation: authenticated JSON calls over
//! HTTPS against the control plane's base URL, with a bearer token obtained
//! from the configured `TokenProvider` on every request.
//!
//! ## Wire Mapping
//!
//! Paths and bodies are defined by this client:
//!
//! | Operation          | Request                                   |
//! |--------------------|-------------------------------------------|
//! | start_machine      | `POST /v1/machine/start {region, size}`   |
//! | stop_machine       | `POST /v1/machine/stop`                   |
//! | machine_status     | `GET /v1/machine`                         |
//! | machine_ip         | `GET /v1/machine/ip` → `{ip}`             |
//! | start_container    | `POST /v1/containers/start {name, image}` |
//! | stop_container     | `POST /v1/containers/stop {name}`         |
//! | list_containers    | `GET /v1/containers` → `{containers: []}` |
//!
//! Error responses map onto the `DevmError` taxonomy: 401 → `AuthRequired`,
//! 404 → `NotFound`/`MachineNotFound`, 409 with body code
//! `machine_not_started` → the distinguished `MachineNotStarted` signal,
//! any other 409 → `Conflict`, and remaining non-2xx → `Api`. Transport-level
//! failures (DNS, TLS, timeout) surface as `Remote`.
//!
use crate::common::auth::TokenProvider;
use crate::common::machines::transport::{ContainerSummary, MachineStatus, RemoteTransport};
use crate::core::config::Config;
use crate::core::error::{DevmError, Result};
use anyhow::{anyhow, Context};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};

/// Which resource a request addressed, for 404 mapping.
#[derive(Debug, Clone, Copy)]
enum Resource<'a> {
    Machine,
    Container(&'a str),
}

/// Error envelope the control plane returns for non-2xx responses.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Body code distinguishing the machine-bootstrap signal from other 409s.
const CODE_MACHINE_NOT_STARTED: &str = "machine_not_started";

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}

#[derive(Debug, Deserialize)]
struct ListContainersResponse {
    #[serde(default)]
    containers: Vec<ContainerSummary>,
}

/// Authenticated HTTP transport for the dev-machine control plane.
#[derive(Debug)]
pub struct HttpTransport<P> {
    client: reqwest::Client,
    base_url: String,
    tokens: P,
}

impl<P: TokenProvider> HttpTransport<P> {
    /// Builds a transport from the loaded configuration. The per-request
    /// timeout comes from `[api] timeout_secs`.
    pub fn new(config: &Config, tokens: P) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout())
            .user_agent(concat!("devm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DevmError::Remote { source: e })
            .context("Failed to construct HTTP client")?;
        Ok(Self {
            client,
            base_url: config.api.url.clone(),
            tokens,
        })
    }

    /// Issues one authenticated request and decodes the JSON response.
    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        resource: Resource<'_>,
    ) -> Result<T> {
        // The token is fetched per request so an expiring token fails the
        // call with AuthRequired instead of an opaque 401 later.
        let token = self.tokens.current_token()?;
        let url = join_url(&self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| DevmError::Remote { source: e })?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| anyhow!(DevmError::Remote { source: e }))
                .with_context(|| format!("Failed to decode response from {url}"));
        }

        // Decode the error envelope if there is one; a missing or malformed
        // body still maps onto a useful kind from the status code alone.
        let body = response.json::<ApiErrorBody>().await.unwrap_or_default();
        Err(anyhow!(map_error(status, &body, resource)))
    }
}

/// Maps a non-2xx response onto the error taxonomy.
fn map_error(status: StatusCode, body: &ApiErrorBody, resource: Resource<'_>) -> DevmError {
    match status.as_u16() {
        401 | 403 => DevmError::AuthRequired,
        404 => match resource {
            Resource::Machine => DevmError::MachineNotFound,
            Resource::Container(name) => DevmError::NotFound {
                name: name.to_string(),
            },
        },
        409 if body.code.as_deref() == Some(CODE_MACHINE_NOT_STARTED) => {
            DevmError::MachineNotStarted
        }
        409 => DevmError::Conflict(
            body.message
                .clone()
                .unwrap_or_else(|| "concurrent mutation lost the race".to_string()),
        ),
        s => DevmError::Api {
            status: s,
            message: body.message.clone().unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            }),
        },
    }
}

/// Joins the base URL and a path without doubling or dropping slashes.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

impl<P: TokenProvider> RemoteTransport for HttpTransport<P> {
    #[instrument(skip(self))]
    async fn start_machine(&self, region: &str, size: &str) -> Result<MachineStatus> {
        self.send(
            Method::POST,
            "v1/machine/start",
            Some(json!({ "region": region, "size": size })),
            Resource::Machine,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn stop_machine(&self) -> Result<MachineStatus> {
        self.send(Method::POST, "v1/machine/stop", None, Resource::Machine)
            .await
    }

    #[instrument(skip(self))]
    async fn machine_status(&self) -> Result<MachineStatus> {
        self.send(Method::GET, "v1/machine", None, Resource::Machine)
            .await
    }

    #[instrument(skip(self))]
    async fn machine_ip(&self) -> Result<String> {
        let response: IpResponse = self
            .send(Method::GET, "v1/machine/ip", None, Resource::Machine)
            .await?;
        Ok(response.ip)
    }

    #[instrument(skip(self, image), fields(container = %name))]
    async fn start_container(&self, name: &str, image: &str) -> Result<ContainerSummary> {
        self.send(
            Method::POST,
            "v1/containers/start",
            Some(json!({ "name": name, "image": image })),
            Resource::Container(name),
        )
        .await
    }

    #[instrument(skip(self), fields(container = %name))]
    async fn stop_container(&self, name: &str) -> Result<ContainerSummary> {
        self.send(
            Method::POST,
            "v1/containers/stop",
            Some(json!({ "name": name })),
            Resource::Container(name),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_containers(&self) -> Result<Vec<ContainerSummary>> {
        let response: ListContainersResponse = self
            .send(Method::GET, "v1/containers", None, Resource::Machine)
            .await?;
        Ok(response.containers)
    }
}
