//! Client layer: orchestrates validation, token generation and the remote call.

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error};

use crate::clock::{Clock, SystemClock};
use crate::domain::{
    AccessToken, DispatchKey, Receiver, ResultCode, SendOptions, SendRequest, ValidationError,
};
use crate::settings::{ConfigurationError, Settings, SettingsSource};
use crate::transport::{self, TransportError};

const DEFAULT_ENDPOINT: &str = "http://sms.gabia.com/api";

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error returned by a send hook. Propagated to the caller unchanged.
pub type HookError = Box<dyn StdError + Send + Sync>;

/// Callback invoked with the built request around the remote call of a send.
///
/// Per-call data passed through [`SendOptions::context`] is available as
/// [`SendRequest::context`].
pub type SendHook = Arc<dyn Fn(&SendRequest) -> Result<(), HookError> + Send + Sync>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn post_xml<'a>(
        &'a self,
        url: &'a str,
        body: String,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug, Clone)]
struct ReqwestTransport {
    client: reqwest::Client,
}

impl HttpTransport for ReqwestTransport {
    fn post_xml<'a>(
        &'a self,
        url: &'a str,
        body: String,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "text/xml")
                .body(body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
/// Failures reported while talking to the gateway.
///
/// Transport and protocol faults are logged and collapsed into [`GatewayError::BadRequest`];
/// the underlying cause is never part of the error value.
pub enum GatewayError {
    /// Connection failure, non-2xx status, XML-RPC fault or unparseable response.
    #[error("Bad request. Please check api docs")]
    BadRequest,

    /// The gateway answered with a non-success code and [`ResultCodePolicy::Strict`] is set.
    #[error("gateway rejected the request with result code {code}")]
    Rejected { code: ResultCode },
}

#[derive(Debug, thiserror::Error)]
/// Errors returned by [`GabiaSmsClient`].
pub enum GabiaSmsError {
    /// Missing or invalid settings.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Caller input was rejected before any network access.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The remote call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A before/after send hook failed; the hook's own error is kept as the source.
    #[error("send hook failed: {0}")]
    Hook(#[source] HookError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// How a send treats a non-success result code from the gateway.
pub enum ResultCodePolicy {
    /// Log the code at debug level and report the send as successful.
    #[default]
    Lenient,
    /// Fail the send with [`GatewayError::Rejected`].
    Strict,
}

#[derive(Clone)]
/// Builder for [`GabiaSmsClient`].
///
/// Use this when you need to customize the endpoint, timeout, hooks, or result-code policy.
pub struct GabiaSmsClientBuilder {
    settings: Settings,
    endpoint: String,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    clock: Arc<dyn Clock>,
    before_send: Option<SendHook>,
    after_send: Option<SendHook>,
    policy: ResultCodePolicy,
}

impl GabiaSmsClientBuilder {
    /// Create a builder with the default endpoint and lenient result-code policy.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            timeout: None,
            user_agent: None,
            clock: Arc::new(SystemClock),
            before_send: None,
            after_send: None,
            policy: ResultCodePolicy::default(),
        }
    }

    /// Override the gateway XML-RPC endpoint URL.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set an HTTP client timeout applied to each remote call.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the HTTP `User-Agent` header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Replace the clock used to derive dispatch keys.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Run `hook` before every send's remote call. An error aborts the send.
    pub fn before_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SendRequest) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.before_send = Some(Arc::new(hook));
        self
    }

    /// Run `hook` after a send's remote call completes.
    pub fn after_send<F>(mut self, hook: F) -> Self
    where
        F: Fn(&SendRequest) -> Result<(), HookError> + Send + Sync + 'static,
    {
        self.after_send = Some(Arc::new(hook));
        self
    }

    pub fn result_code_policy(mut self, policy: ResultCodePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build a [`GabiaSmsClient`].
    pub fn build(self) -> Result<GabiaSmsClient, ConfigurationError> {
        url::Url::parse(&self.endpoint).map_err(|source| ConfigurationError::InvalidEndpoint {
            value: self.endpoint.clone(),
            source,
        })?;

        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(0);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build().map_err(ConfigurationError::HttpClient)?;

        Ok(GabiaSmsClient {
            settings: Arc::new(self.settings),
            endpoint: self.endpoint,
            http: Arc::new(ReqwestTransport { client }),
            clock: self.clock,
            before_send: self.before_send,
            after_send: self.after_send,
            policy: self.policy,
        })
    }
}

#[derive(Clone)]
/// High-level Gabia SMS client.
///
/// Holds no mutable state after construction: clone it or share it behind an `Arc` across
/// tasks. Every call opens its own connection to `http://sms.gabia.com/api` (or the
/// configured endpoint) and performs no retries.
pub struct GabiaSmsClient {
    settings: Arc<Settings>,
    endpoint: String,
    http: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    before_send: Option<SendHook>,
    after_send: Option<SendHook>,
    policy: ResultCodePolicy,
}

impl GabiaSmsClient {
    /// Create a client using the default endpoint and no hooks.
    ///
    /// For more customization, use [`GabiaSmsClient::builder`].
    pub fn new(settings: Settings) -> Self {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            settings: Arc::new(settings),
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            http: Arc::new(ReqwestTransport { client }),
            clock: Arc::new(SystemClock),
            before_send: None,
            after_send: None,
            policy: ResultCodePolicy::default(),
        }
    }

    /// Resolve settings from `source` and create a client with defaults.
    pub fn from_source(
        source: &(impl SettingsSource + ?Sized),
    ) -> Result<Self, ConfigurationError> {
        Ok(Self::new(Settings::resolve(source)?))
    }

    /// Start building a client with custom settings.
    pub fn builder(settings: Settings) -> GabiaSmsClientBuilder {
        GabiaSmsClientBuilder::new(settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Send a message and return its dispatch key.
    ///
    /// `receiver` must be a single number for `sms`/`lms` and a collection for
    /// `multi_sms`/`multi_lms`. Duplicate bulk receivers are collapsed.
    ///
    /// Errors:
    /// - [`GabiaSmsError::Validation`] for invalid input, before any network access,
    /// - [`GabiaSmsError::Hook`] when a hook fails,
    /// - [`GabiaSmsError::Gateway`] when the remote call fails.
    ///
    /// Under [`ResultCodePolicy::Lenient`] a non-success result code is only logged.
    pub async fn send(
        &self,
        message: &str,
        receiver: impl Into<Receiver>,
        options: SendOptions,
    ) -> Result<DispatchKey, GabiaSmsError> {
        let request = self.build_request(message, &receiver.into(), &options)?;
        self.dispatch(&request).await
    }

    /// Validate the inputs and assemble a request without sending it.
    pub fn build_request(
        &self,
        message: &str,
        receiver: &Receiver,
        options: &SendOptions,
    ) -> Result<SendRequest, ValidationError> {
        SendRequest::build(message, receiver, options, &self.settings, self.clock.as_ref())
    }

    /// Send an already built request: hooks, remote call, result-code handling.
    pub async fn dispatch(&self, request: &SendRequest) -> Result<DispatchKey, GabiaSmsError> {
        if let Some(hook) = &self.before_send {
            hook(request).map_err(GabiaSmsError::Hook)?;
        }

        let token = AccessToken::generate(self.settings.api_key());
        let payload = transport::encode_send_payload(self.settings.api_id(), &token, request);

        debug!(
            key = %request.key(),
            sms_type = %request.sms_type(),
            "sending sms"
        );
        let code = self.call(payload).await.map_err(gateway_fault)?;

        if !code.is_success() {
            debug!(
                key = %request.key(),
                code = %code,
                "gateway reported non-success result code"
            );
            if self.policy == ResultCodePolicy::Strict {
                return Err(GatewayError::Rejected { code }.into());
            }
        }

        if let Some(hook) = &self.after_send {
            hook(request).map_err(GabiaSmsError::Hook)?;
        }

        Ok(request.key())
    }

    /// Look up the delivery result of an earlier send.
    ///
    /// The gateway's code is returned as-is, success or not. Only transport and protocol
    /// faults fail with [`GabiaSmsError::Gateway`].
    pub async fn get_send_result(&self, key: DispatchKey) -> Result<ResultCode, GabiaSmsError> {
        let token = AccessToken::generate(self.settings.api_key());
        let payload = transport::encode_send_result_payload(self.settings.api_id(), &token, key);

        debug!(key = %key, "querying send result");
        Ok(self.call(payload).await.map_err(gateway_fault)?)
    }

    async fn call(&self, payload: String) -> Result<ResultCode, TransportError> {
        let body = transport::encode_method_call(transport::METHOD_NAME, &payload);
        let response = self
            .http
            .post_xml(&self.endpoint, body)
            .await
            .map_err(TransportError::Http)?;

        if !(200..=299).contains(&response.status) {
            let body = if response.body.trim().is_empty() {
                None
            } else {
                Some(response.body)
            };
            return Err(TransportError::HttpStatus {
                status: response.status,
                body,
            });
        }

        let document = transport::decode_method_response(&response.body)?;
        transport::parse_result_code(&document)
    }
}

fn gateway_fault(err: TransportError) -> GatewayError {
    error!(error = %err, "gateway call failed");
    GatewayError::BadRequest
}
