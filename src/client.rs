//! High-level entry point bundling both routing hosts.
//!
//! A [`RiotClient`] owns two [`Dispatcher`]s: one for the configured [`Platform`] host and
//! one for the configured [`Region`] host. Each has its own limiter, so the two hosts are
//! budgeted independently. Both share a single transport (and connection pool).

use crate::dispatcher::{Dispatcher, DispatcherConfig, DEFAULT_RETRIES, DEFAULT_RETRY_DELAY, DEFAULT_TIMEOUT};
use crate::error::ConfigError;
use crate::rate_limit::{QuotaProfile, RateLimitConfig};
use crate::routing::{Platform, Region};
use crate::services::{
    AccountService, DataDragonService, LeagueService, MatchService, SpectatorService, SummonerService,
};
use crate::transport::{ReqwestTransport, Transport};
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Settings for a [`RiotClient`].
#[derive(Clone, PartialEq, Eq)]
pub struct RiotClientConfig {
    api_key: String,
    pub platform: Platform,
    pub region: Region,
    pub timeout: Duration,
    pub retries: usize,
    pub retry_delay: Duration,
    /// Applied to each host separately.
    pub rate_limit: RateLimitConfig,
}

impl std::fmt::Debug for RiotClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiotClientConfig")
            .field("api_key", &"<redacted>")
            .field("platform", &self.platform)
            .field("region", &self.region)
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("retry_delay", &self.retry_delay)
            .field("rate_limit", &self.rate_limit)
            .finish()
    }
}

impl RiotClientConfig {
    pub fn builder(api_key: impl Into<String>) -> RiotClientConfigBuilder {
        RiotClientConfigBuilder {
            api_key: api_key.into(),
            platform: Platform::default(),
            region: Region::default(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            rate_limit: RateLimitConfig::default(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    fn dispatcher_config(&self, base_url: String) -> Result<DispatcherConfig, ConfigError> {
        DispatcherConfig::builder(base_url, self.api_key.clone())
            .timeout(self.timeout)
            .retries(self.retries)
            .retry_delay(self.retry_delay)
            .rate_limit(self.rate_limit)
            .build()
    }
}

#[derive(Debug, Clone)]
pub struct RiotClientConfigBuilder {
    api_key: String,
    platform: Platform,
    region: Region,
    timeout: Duration,
    retries: usize,
    retry_delay: Duration,
    rate_limit: RateLimitConfig,
}

impl RiotClientConfigBuilder {
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Regional host, [`Region::Americas`] unless set. Independent of the platform.
    pub fn region(mut self, region: Region) -> Self {
        self.region = region;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

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

    pub fn build(self) -> Result<RiotClientConfig, ConfigError> {
        let api_key = self.api_key.trim();
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        self.rate_limit.validate()?;
        Ok(RiotClientConfig {
            api_key: api_key.to_string(),
            platform: self.platform,
            region: self.region,
            timeout: self.timeout,
            retries: self.retries,
            retry_delay: self.retry_delay,
            rate_limit: self.rate_limit,
        })
    }
}

/// Riot API client with typed service views.
#[derive(Debug)]
pub struct RiotClient {
    config: RwLock<RiotClientConfig>,
    platform: Arc<Dispatcher>,
    regional: Arc<Dispatcher>,
}

impl RiotClient {
    /// Client backed by a fresh [`ReqwestTransport`].
    pub fn new(config: RiotClientConfig) -> Result<Self, ConfigError> {
        Self::with_transport(config, Arc::new(ReqwestTransport::new()?))
    }

    pub fn with_transport(config: RiotClientConfig, transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        Self::with_dispatcher_setup(config, transport, |dispatcher| dispatcher)
    }

    /// Like [`with_transport`](Self::with_transport), passing both dispatchers through
    /// `setup` (to install a clock or sleeper) before they are shared.
    pub fn with_dispatcher_setup<F>(
        config: RiotClientConfig,
        transport: Arc<dyn Transport>,
        setup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(Dispatcher) -> Dispatcher,
    {
        let platform = Dispatcher::with_shared_transport(
            config.dispatcher_config(config.platform.host())?,
            transport.clone(),
        );
        let regional =
            Dispatcher::with_shared_transport(config.dispatcher_config(config.region.host())?, transport);
        tracing::info!(platform = %config.platform, region = %config.region, "riot client ready");
        Ok(Self {
            config: RwLock::new(config),
            platform: Arc::new(setup(platform)),
            regional: Arc::new(setup(regional)),
        })
    }

    /// Snapshot of the current settings.
    pub fn config(&self) -> RiotClientConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn platform(&self) -> Platform {
        self.config().platform
    }

    pub fn region(&self) -> Region {
        self.config().region
    }

    pub fn platform_dispatcher(&self) -> &Arc<Dispatcher> {
        &self.platform
    }

    pub fn regional_dispatcher(&self) -> &Arc<Dispatcher> {
        &self.regional
    }

    pub fn account(&self) -> AccountService {
        AccountService::new(self.regional.clone())
    }

    pub fn matches(&self) -> MatchService {
        MatchService::new(self.regional.clone())
    }

    pub fn summoner(&self) -> SummonerService {
        SummonerService::new(self.platform.clone())
    }

    pub fn league(&self) -> LeagueService {
        LeagueService::new(self.platform.clone())
    }

    pub fn spectator(&self) -> SpectatorService {
        SpectatorService::new(self.platform.clone())
    }

    /// Static assets with the default Data Dragon settings, budgeted on the platform limiter.
    pub fn data_dragon(&self) -> DataDragonService {
        DataDragonService::new(self.platform.clone())
    }

    /// Rotate the credential on both hosts.
    pub fn update_api_key(&self, api_key: impl Into<String>) -> Result<(), ConfigError> {
        let api_key = api_key.into();
        self.platform.update_api_key(api_key.clone())?;
        self.regional.update_api_key(api_key.clone())?;
        self.write_config().api_key = api_key.trim().to_string();
        Ok(())
    }

    /// Re-point platform-routed services. Limiter state is kept.
    pub fn update_platform(&self, platform: Platform) -> Result<(), ConfigError> {
        self.platform.update_base_url(platform.host())?;
        self.write_config().platform = platform;
        Ok(())
    }

    /// Re-point region-routed services. Limiter state is kept.
    pub fn update_region(&self, region: Region) -> Result<(), ConfigError> {
        self.regional.update_base_url(region.host())?;
        self.write_config().region = region;
        Ok(())
    }

    fn write_config(&self) -> std::sync::RwLockWriteGuard<'_, RiotClientConfig> {
        self.config.write().unwrap_or_else(|e| e.into_inner())
    }
}
