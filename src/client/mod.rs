//! Client layer: orchestrates transport calls and maps transport ↔ domain.
//!
//! Every gateway call goes through `dispatch`, which applies the shared HTTP
//! contract: a per-call connect timeout taken from the settings snapshot, a
//! fixed 60 second overall timeout, no redirects, and fail-on-error handling
//! for status codes of 400 and above (the body is not read).

mod balance;
mod nexxtmobile;
mod sipgate;

use std::error::Error as StdError;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::domain::{HttpRequest, Method, ValidationError};

pub use balance::{BALANCE_CURRENCY_SUFFIX, BALANCE_REFRESH_DELAY, BALANCE_TIMER, BALANCE_VALUE};
pub use nexxtmobile::{DEFAULT_NEXXTMOBILE_ENDPOINT, NexxtMobileClient, NexxtMobileClientBuilder};
pub use sipgate::{DEFAULT_SIPGATE_ENDPOINT, SipgateClient, SipgateClientBuilder};

/// Overall timeout of every gateway request, independent of the connect timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone)]
struct HttpResponse {
    status: u16,
    body: String,
}

trait HttpTransport: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: &'a HttpRequest,
        connect_timeout: Duration,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>>;
}

#[derive(Debug)]
struct ReqwestTransport {
    user_agent: Option<String>,
    // reqwest fixes the connect timeout per client, so keep the last one built.
    cached: Mutex<Option<(Duration, reqwest::Client)>>,
}

impl ReqwestTransport {
    fn new(user_agent: Option<String>) -> Self {
        Self {
            user_agent,
            cached: Mutex::new(None),
        }
    }

    fn client_for(&self, connect_timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((timeout, client)) = cached.as_ref() {
            if *timeout == connect_timeout {
                return Ok(client.clone());
            }
        }

        let mut builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none());
        // Zero means "no explicit connect timeout", bounded only by REQUEST_TIMEOUT.
        if !connect_timeout.is_zero() {
            builder = builder.connect_timeout(connect_timeout);
        }
        if let Some(user_agent) = self.user_agent.as_deref() {
            builder = builder.user_agent(user_agent);
        }
        let client = builder.build()?;
        *cached = Some((connect_timeout, client.clone()));
        Ok(client)
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: &'a HttpRequest,
        connect_timeout: Duration,
    ) -> BoxFuture<'a, Result<HttpResponse, Box<dyn StdError + Send + Sync>>> {
        Box::pin(async move {
            let client = self.client_for(connect_timeout)?;
            let mut builder = match request.method {
                Method::Get => client.get(&request.url),
                Method::Post => client.post(&request.url),
            };
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some((user, password)) = &request.basic_auth {
                builder = builder.basic_auth(user, Some(password));
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            if status >= 400 {
                return Ok(HttpResponse {
                    status,
                    body: String::new(),
                });
            }
            let body = response.text().await?;
            Ok(HttpResponse { status, body })
        })
    }
}

#[derive(Debug, thiserror::Error)]
/// Errors produced by the gateway adapters.
///
/// The host-facing operations (`send_message`, `send_message_ex`,
/// `get_current_balance`) log these and collapse them to `bool`/`()`; the
/// `try_*` variants return them unchanged.
pub enum SmsError {
    /// The instance's `Active` flag is off.
    #[error("instance is inactive")]
    Inactive,

    /// The settings could not be read from the host.
    #[error("failed to read settings: {0}")]
    Config(#[source] Box<dyn StdError + Send + Sync>),

    /// A credential, sender number, recipient, or text was rejected before sending.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A configured endpoint is not a valid URL.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// The stored recipient list has no enabled entry.
    #[error("no enabled recipients")]
    NoRecipients,

    /// HTTP client / transport failure (DNS, TLS, timeouts, refused connections).
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),

    /// Non-successful HTTP status code returned by the server.
    #[error("unexpected HTTP status: {status}")]
    HttpStatus { status: u16, body: Option<String> },

    /// The outgoing request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[source] Box<dyn StdError + Send + Sync>),

    /// A 2xx reply without a body where one is required.
    #[error("no response received")]
    EmptyResponse,

    /// Response body could not be parsed as the expected format.
    #[error("parse error: {0}")]
    Parse(#[source] Box<dyn StdError + Send + Sync>),

    /// The gateway replied, but flagged the request as failed.
    #[error("API error: {0}")]
    Api(&'static str),

    /// The balance reply carried no `result.balanceFormated`.
    #[error("balance missing from response")]
    MissingBalance,

    /// Some sends of a broadcast failed; the others were still attempted.
    #[error("{failed} of {attempted} recipients failed")]
    Broadcast { failed: usize, attempted: usize },
}

fn ensure_active(active: bool) -> Result<(), SmsError> {
    if active {
        Ok(())
    } else {
        Err(SmsError::Inactive)
    }
}

fn broadcast_result(failed: usize, attempted: usize) -> Result<(), SmsError> {
    if failed == 0 {
        Ok(())
    } else {
        Err(SmsError::Broadcast { failed, attempted })
    }
}

/// Perform one request and reject anything outside 2xx.
async fn dispatch(
    http: &dyn HttpTransport,
    request: &HttpRequest,
    connect_timeout: Duration,
) -> Result<HttpResponse, SmsError> {
    tracing::debug!(?request, ?connect_timeout, "dispatching gateway request");

    let response = http
        .execute(request, connect_timeout)
        .await
        .map_err(SmsError::Transport)?;
    tracing::debug!(
        status = response.status,
        body = %response.body,
        "gateway responded"
    );

    if !(200..=299).contains(&response.status) {
        let body = if response.body.trim().is_empty() {
            None
        } else {
            Some(response.body)
        };
        return Err(SmsError::HttpStatus {
            status: response.status,
            body,
        });
    }
    Ok(response)
}
