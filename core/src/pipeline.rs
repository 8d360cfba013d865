//! The request pipeline every endpoint goes through.
//!
//! # Design
//! `RequestPipeline` owns the immutable config, the bearer token and a
//! transport. `execute` performs one logical call: it builds the
//! `HttpRequest`, sends it up to `max_retries + 1` times, sleeping between
//! attempts on 429 and on transient transport failures, and maps the final
//! status onto `ApiError`. The retry budget is shared between both retry
//! paths and lives entirely on the stack of a single call, so nothing here
//! needs locking.
//!
//! Backoff blocks the calling thread. The sleep function is replaceable so
//! tests can observe delays without waiting for them.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{debug, info_span, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Query, Transport};

const USER_AGENT: &str = concat!("coc-core/", env!("CARGO_PKG_VERSION"));

/// Blocking sleep used between attempts.
pub type Sleeper = Arc<dyn Fn(Duration) + Send + Sync>;

pub struct RequestPipeline<T> {
    config: ClientConfig,
    default_headers: Vec<(String, String)>,
    transport: T,
    sleep: Sleeper,
}

impl<T: Transport> RequestPipeline<T> {
    /// Validate `config` and bind it to `token` and `transport`.
    pub fn new(mut config: ClientConfig, token: &str, transport: T) -> ApiResult<Self> {
        // Struct literals bypass `with_base_url`.
        let trimmed = config.base_url.trim_end_matches('/').len();
        config.base_url.truncate(trimmed);
        config.validate()?;
        if token.trim().is_empty() {
            return Err(ApiError::config("API token cannot be empty"));
        }

        let default_headers = vec![
            ("Authorization".to_string(), format!("Bearer {}", token.trim())),
            ("Accept".to_string(), "application/json".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
            ("User-Agent".to_string(), USER_AGENT.to_string()),
        ];

        Ok(Self {
            config,
            default_headers,
            transport,
            sleep: Arc::new(std::thread::sleep),
        })
    }

    /// Replace the function used to wait between attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleep: Sleeper) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Assemble the request `execute` would send for these arguments.
    pub fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: Query,
        body: Option<&Value>,
    ) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.config.base_url),
            headers: self.default_headers.clone(),
            query,
            body: body.map(Value::to_string),
        }
    }

    /// Perform one logical API call with bounded retry.
    pub fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        query: Query,
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        let request = self.build_request(method, path, query, body);
        let max_attempts = self.config.max_attempts();

        let request_id = Uuid::new_v4();
        let span = info_span!("coc_request", request_id = %request_id, method = %method, path = %path);
        let _guard = span.enter();
        let start = Instant::now();

        let mut attempt: u32 = 0;
        loop {
            let is_last = attempt + 1 >= max_attempts;
            debug!(attempt = attempt + 1, max_attempts, "sending request");

            let delay = match self.transport.send(&request, self.config.timeout) {
                Err(err) if err.is_transient() && !is_last => {
                    let delay = self.config.backoff_for_attempt(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transport failure, retrying"
                    );
                    delay
                }
                Err(err) => {
                    warn!(attempt = attempt + 1, error = %err, "transport failure, giving up");
                    return Err(ApiError::Network {
                        attempts: attempt + 1,
                        source: err,
                    });
                }
                Ok(response) if response.status == 429 => {
                    if is_last {
                        warn!(attempt = attempt + 1, "rate limited, retries exhausted");
                        return Err(ApiError::RateLimitExceeded {
                            attempts: attempt + 1,
                        });
                    }
                    let delay =
                        rate_limit_delay(&self.config, attempt, response.header("Retry-After"));
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        "rate limited, retrying"
                    );
                    delay
                }
                Ok(response) => {
                    debug!(
                        attempt = attempt + 1,
                        status = response.status,
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "response received"
                    );
                    return interpret(response);
                }
            };

            (self.sleep)(delay);
            attempt += 1;
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for RequestPipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("config", &self.config)
            .field("token", &"<redacted>")
            .field("transport", &self.transport)
            .finish()
    }
}

/// Delay before retrying a 429 answered on zero-based `attempt`.
///
/// The larger of a parseable `Retry-After` (seconds, integer or fractional)
/// and the exponential default, so `Retry-After: 0` never retries at once.
pub fn rate_limit_delay(config: &ClientConfig, attempt: u32, retry_after: Option<&str>) -> Duration {
    let backoff = config.backoff_for_attempt(attempt);
    match retry_after.and_then(parse_retry_after) {
        Some(delay) => delay.max(backoff),
        None => backoff,
    }
}

/// Parse a `Retry-After` value given in seconds. HTTP-date values, negative
/// numbers and garbage yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Map a final, non-429 response onto the call's result.
fn interpret(response: HttpResponse) -> ApiResult<Value> {
    let HttpResponse { status, body, .. } = response;
    match status {
        200..=299 => serde_json::from_str(&body).map_err(|e| ApiError::Api {
            status,
            body,
            source: Some(e),
        }),
        401 | 403 => Err(ApiError::Unauthorized { status, body }),
        404 => Err(ApiError::NotFound { body }),
        _ => Err(ApiError::Api {
            status,
            body,
            source: None,
        }),
    }
}
