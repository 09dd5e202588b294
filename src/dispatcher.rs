//! The single egress point for API calls.
//!
//! A [`Dispatcher`] owns one base host, one credential and one [`RateLimiter`]. Every call:
//!
//! 1. waits on the limiter and records itself *before* the request is sent, so a request that
//!    starts counts against the quota even if it later fails;
//! 2. sends the request through the [`Transport`];
//! 3. on an upstream `429`, sleeps for `retry-after` seconds (1 s when absent) and resubmits
//!    the same request exactly once. The resubmission does **not** pass through the local
//!    limiter again: the upstream server has already told us when to come back, and gating it
//!    locally could push the retry past that point;
//! 4. folds transport failures, HTTP error statuses and body-shape mismatches into
//!    [`ApiError`] on the `Left` side of the returned [`Either`].
//!
//! [`Dispatcher::request_with_retry`] layers an opt-in bounded retry loop with exponential
//! backoff on top of [`Dispatcher::get`].

use crate::clock::Clock;
use crate::error::{ApiError, ConfigError, RateLimitError};
use crate::rate_limit::{QuotaProfile, RateLimitConfig, RateLimitStatus, RateLimiter};
use crate::retry::RetryPolicy;
use crate::routing::{Platform, Region};
use crate::sleeper::{Sleeper, TokioSleeper};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::{Backoff, Either};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Header carrying the credential.
pub const API_KEY_HEADER: &str = "X-Riot-Token";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_RETRIES: usize = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(1000);
/// Wait before resubmitting a 429 that carried no usable `retry-after`.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_millis(1000);

/// Successful response with a decoded body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: u16,
    pub status_text: String,
    pub headers: HashMap<String, String>,
}

impl<T> ApiResponse<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ApiResponse<U> {
        ApiResponse {
            data: f(self.data),
            status: self.status,
            status_text: self.status_text,
            headers: self.headers,
        }
    }
}

/// Per-call additions to the dispatcher defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Add a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Construction-time settings for a [`Dispatcher`].
#[derive(Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    base_url: String,
    api_key: String,
    timeout: Duration,
    retries: usize,
    retry_delay: Duration,
    rate_limit: RateLimitConfig,
}

impl std::fmt::Debug for DispatcherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatcherConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("retry_delay", &self.retry_delay)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

impl DispatcherConfig {
    pub fn builder(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> DispatcherConfigBuilder {
        DispatcherConfigBuilder {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            rate_limit: RateLimitConfig::default(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retries(&self) -> usize {
        self.retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn rate_limit(&self) -> &RateLimitConfig {
        &self.rate_limit
    }
}

/// Builder for [`DispatcherConfig`].
#[derive(Clone)]
pub struct DispatcherConfigBuilder {
    base_url: String,
    api_key: String,
    timeout: Duration,
    retries: usize,
    retry_delay: Duration,
    rate_limit: RateLimitConfig,
}

impl DispatcherConfigBuilder {
    /// Transport connect + read timeout per request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Retries after the first attempt in [`Dispatcher::request_with_retry`].
    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Base of the exponential backoff in [`Dispatcher::request_with_retry`].
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn profile(self, profile: QuotaProfile) -> Self {
        self.rate_limit(profile.config())
    }

    pub fn build(self) -> Result<DispatcherConfig, ConfigError> {
        let api_key = validate_api_key(&self.api_key)?;
        let base_url = validate_base_url(&self.base_url)?;
        self.rate_limit.validate()?;
        Ok(DispatcherConfig {
            base_url,
            api_key,
            timeout: self.timeout,
            retries: self.retries,
            retry_delay: self.retry_delay,
            rate_limit: self.rate_limit,
        })
    }
}

fn validate_api_key(api_key: &str) -> Result<String, ConfigError> {
    let trimmed = api_key.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::MissingApiKey);
    }
    Ok(trimmed.to_string())
}

fn validate_base_url(base_url: &str) -> Result<String, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidBaseUrl { url: base_url.to_string(), reason };
    let parsed = url::Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".into()));
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[derive(Clone)]
struct Endpoint {
    base_url: String,
    api_key: String,
}

/// Rate-limited, error-normalizing HTTP client for one host/credential pair.
pub struct Dispatcher {
    endpoint: RwLock<Endpoint>,
    timeout: Duration,
    retries: usize,
    retry_delay: Duration,
    rate_limiter: RateLimiter,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.base_url())
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("retry_delay", &self.retry_delay)
            .field("rate_limiter", &self.rate_limiter)
            .field("transport", &self.transport)
            .finish()
    }
}

impl Dispatcher {
    /// Dispatcher backed by a fresh [`ReqwestTransport`].
    pub fn new(config: DispatcherConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_transport(config, ReqwestTransport::new()?))
    }

    pub fn with_transport<T: Transport + 'static>(config: DispatcherConfig, transport: T) -> Self {
        Self::with_shared_transport(config, Arc::new(transport))
    }

    /// Several dispatchers can share one transport (and its connection pool) while keeping
    /// separate quotas.
    pub fn with_shared_transport(config: DispatcherConfig, transport: Arc<dyn Transport>) -> Self {
        let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
        // DispatcherConfig can only come out of the validating builder
        let mut rate_limiter = RateLimiter::from_valid(config.rate_limit);
        rate_limiter.set_sleeper(sleeper.clone());
        Self {
            endpoint: RwLock::new(Endpoint { base_url: config.base_url, api_key: config.api_key }),
            timeout: config.timeout,
            retries: config.retries,
            retry_delay: config.retry_delay,
            rate_limiter,
            transport,
            sleeper,
        }
    }

    /// Dispatcher for a platform host such as `https://na1.api.riotgames.com`.
    pub fn for_platform(platform: Platform, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(DispatcherConfig::builder(platform.host(), api_key).build()?)
    }

    /// Dispatcher for a regional host such as `https://europe.api.riotgames.com`.
    pub fn for_region(region: Region, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(DispatcherConfig::builder(region.host(), api_key).build()?)
    }

    /// Override the clock used by the rate limiter (resets its windows).
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.rate_limiter.set_clock(Arc::new(clock));
        self
    }

    /// Override how the dispatcher and its limiter wait.
    pub fn with_sleeper<S: Sleeper + 'static>(mut self, sleeper: S) -> Self {
        let sleeper: Arc<dyn Sleeper> = Arc::new(sleeper);
        self.rate_limiter.set_sleeper(sleeper.clone());
        self.sleeper = sleeper;
        self
    }

    pub fn base_url(&self) -> String {
        self.read_endpoint().base_url
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Swap the credential for all subsequent calls. In-flight calls keep the old one.
    pub fn update_api_key(&self, api_key: impl Into<String>) -> Result<(), ConfigError> {
        let api_key = validate_api_key(&api_key.into())?;
        self.endpoint.write().unwrap_or_else(|e| e.into_inner()).api_key = api_key;
        tracing::info!("api key rotated");
        Ok(())
    }

    /// Point all subsequent calls at a different host.
    pub fn update_base_url(&self, base_url: impl Into<String>) -> Result<(), ConfigError> {
        let base_url = validate_base_url(&base_url.into())?;
        tracing::info!(base_url = %base_url, "base url updated");
        self.endpoint.write().unwrap_or_else(|e| e.into_inner()).base_url = base_url;
        Ok(())
    }

    pub fn rate_limit_status(&self) -> RateLimitStatus {
        self.rate_limiter.status()
    }

    pub fn reset_rate_limiter(&self) {
        self.rate_limiter.reset();
    }

    fn read_endpoint(&self) -> Endpoint {
        self.endpoint.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// GET `path` (relative to the base URL, or absolute) and decode the JSON body into `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Either<ApiError, ApiResponse<T>> {
        self.get_with(path, &RequestOptions::default()).await
    }

    /// [`get`](Self::get) with extra query parameters, headers or a timeout override.
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Either<ApiError, ApiResponse<T>> {
        let request = match self.build_request(path, options) {
            Ok(request) => request,
            Err(err) => return Either::Left(err),
        };

        if let Err(RateLimitError::DailyQuotaExhausted { limit }) = self.rate_limiter.acquire().await
        {
            return Either::Left(ApiError::daily_quota_exhausted(limit));
        }

        let response = match self.send(&request).await {
            Ok(response) => response,
            Err(err) => return Either::Left(err),
        };

        if !response.is_success() {
            let err = ApiError::from_http(response.status, &response.status_text, &response.body);
            tracing::debug!(status = err.status, url = %request.url, "request failed");
            return Either::Left(err);
        }

        decode(response).map_left(|details| {
            ApiError::validation("Response body validation failed", details)
        })
    }

    /// Send once, resubmitting a single time after an upstream 429.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = self.transport.send(request).await?;
        if response.status != 429 {
            return Ok(response);
        }

        let wait = retry_after(&response);
        tracing::warn!(
            retry_after_ms = wait.as_millis() as u64,
            url = %request.url,
            "upstream rate limit hit; resubmitting once"
        );
        self.sleeper.sleep(wait).await;
        Ok(self.transport.send(request).await?)
    }

    /// [`get_with`](Self::get_with) wrapped in up to `retries + 1` attempts.
    ///
    /// Client errors other than 429 are returned at once. Before attempt `n` (1-based retry
    /// count) the dispatcher waits `retry_delay * 2^(n-1)`: 1 s, 2 s, 4 s with the defaults.
    pub async fn request_with_retry<T: DeserializeOwned>(
        &self,
        path: &str,
        options: &RequestOptions,
    ) -> Either<ApiError, ApiResponse<T>> {
        let policy = match RetryPolicy::builder()
            .max_attempts(self.retries.saturating_add(1))
            .backoff(Backoff::exponential(self.retry_delay))
            .should_retry(ApiError::is_retryable)
            .with_sleeper(self.sleeper.clone())
            .build()
        {
            Ok(policy) => policy,
            Err(err) => return Either::Left(ApiError::request_setup(err.to_string())),
        };
        policy.execute(|| self.get_with(path, options)).await
    }

    fn build_request(&self, path: &str, options: &RequestOptions) -> Result<HttpRequest, ApiError> {
        let endpoint = self.read_endpoint();
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", endpoint.base_url, path)
        } else {
            format!("{}/{}", endpoint.base_url, path)
        };
        url::Url::parse(&url).map_err(|e| ApiError::request_setup(format!("invalid url {url}: {e}")))?;

        let mut headers = vec![
            (API_KEY_HEADER.to_string(), endpoint.api_key),
            ("Accept".to_string(), "application/json".to_string()),
        ];
        headers.extend(options.headers.iter().cloned());

        Ok(HttpRequest {
            url,
            query: options.query.clone(),
            headers,
            timeout: options.timeout.unwrap_or(self.timeout),
        })
    }
}

fn retry_after(response: &HttpResponse) -> Duration {
    response
        .header("retry-after")
        .and_then(|value| value.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETRY_AFTER)
}

fn decode<T: DeserializeOwned>(response: HttpResponse) -> Either<String, ApiResponse<T>> {
    let parsed = if response.body.is_empty() {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(&response.body)
    };
    match parsed {
        Ok(data) => Either::Right(ApiResponse {
            data,
            status: response.status,
            status_text: response.status_text,
            headers: response.headers,
        }),
        Err(err) => Either::Left(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_rejects_blank_key() {
        let err = DispatcherConfig::builder("https://na1.api.riotgames.com", "  ").build();
        assert_eq!(err.unwrap_err(), ConfigError::MissingApiKey);
    }

    #[test]
    fn builder_rejects_bad_urls() {
        assert!(matches!(
            DispatcherConfig::builder("not a url", "key").build(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            DispatcherConfig::builder("ftp://na1.api.riotgames.com", "key").build(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn builder_applies_defaults_and_trims_slash() {
        let config = DispatcherConfig::builder("https://na1.api.riotgames.com/", "key")
            .build()
            .unwrap();
        assert_eq!(config.base_url(), "https://na1.api.riotgames.com");
        assert_eq!(config.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(config.retries(), 3);
        assert_eq!(config.retry_delay(), Duration::from_millis(1000));
        assert_eq!(*config.rate_limit(), RateLimitConfig::new(20, 100));
    }

    #[test]
    fn builder_rejects_zero_rate_limit() {
        let err = DispatcherConfig::builder("https://na1.api.riotgames.com", "key")
            .rate_limit(RateLimitConfig::new(0, 10))
            .build();
        assert!(matches!(err, Err(ConfigError::InvalidRateLimit { .. })));
    }

    #[test]
    fn debug_output_redacts_key() {
        let config = DispatcherConfig::builder("https://na1.api.riotgames.com", "RGAPI-secret")
            .build()
            .unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("RGAPI-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn retry_after_parses_seconds_or_defaults() {
        let mut response = HttpResponse { status: 429, ..Default::default() };
        assert_eq!(retry_after(&response), DEFAULT_RETRY_AFTER);
        response.headers.insert("retry-after".into(), "3".into());
        assert_eq!(retry_after(&response), Duration::from_secs(3));
        response.headers.insert("retry-after".into(), "Wed, 21 Oct 2015 07:28:00 GMT".into());
        assert_eq!(retry_after(&response), DEFAULT_RETRY_AFTER);
    }

    #[test]
    fn empty_body_decodes_into_unit_or_option() {
        let response = HttpResponse { status: 204, ..Default::default() };
        assert!(decode::<()>(response.clone()).is_right());
        assert_eq!(decode::<Option<u32>>(response).right().map(|r| r.data), Some(None));
    }

    #[test]
    fn request_options_collect_optional_query() {
        let options = RequestOptions::new()
            .query("count", 5)
            .query_opt("queue", None::<u32>)
            .query_opt("type", Some("ranked"))
            .timeout(Duration::from_secs(2));
        assert_eq!(
            options.query,
            vec![("count".to_string(), "5".to_string()), ("type".to_string(), "ranked".to_string())]
        );
        assert_eq!(options.timeout, Some(Duration::from_secs(2)));
    }
}
