#![forbid(unsafe_code)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # riftline
//!
//! Rate-limited, typed async client for the Riot Games REST API.
//!
//! ## Features
//!
//! - **Client-side quota enforcement** over per-second, per-two-minute and per-day windows
//! - **Single egress point** ([`Dispatcher`]) that folds every failure into an [`ApiError`]
//! - **Upstream 429 handling** honoring `retry-after`, plus opt-in exponential retry
//! - **Typed services** for account, summoner, league, spectator and match endpoints, plus
//!   uncached Data Dragon static assets
//! - **Injectable time** ([`Clock`], [`Sleeper`]) for deterministic tests
//!
//! Results come back as [`Either<ApiError, T>`](Either): `Left` on failure, `Right` on
//! success. Nothing network-related panics or returns `Err`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use riftline::{Either, Platform, RiotClient, RiotClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RiotClientConfig::builder("RGAPI-...").platform(Platform::Euw1).build()?;
//!     let client = RiotClient::new(config)?;
//!
//!     match client.account().account_by_riot_id("Faker", "KR1").await {
//!         Either::Right(account) => println!("{}", account.puuid),
//!         Either::Left(err) => eprintln!("lookup failed: {err}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod backoff;
pub mod client;
pub mod clock;
pub mod dispatcher;
pub mod either;
pub mod error;
pub mod rate_limit;
pub mod retry;
pub mod routing;
pub mod services;
pub mod sleeper;
pub mod transport;

// Re-exports
pub use backoff::Backoff;
pub use client::{RiotClient, RiotClientConfig, RiotClientConfigBuilder};
pub use clock::{Clock, ManualClock, SystemClock};
pub use dispatcher::{ApiResponse, Dispatcher, DispatcherConfig, DispatcherConfigBuilder, RequestOptions};
pub use either::Either;
pub use error::{ApiError, ConfigError, RateLimitError, TransportError};
pub use rate_limit::{QuotaProfile, RateLimitConfig, RateLimitStatus, RateLimiter};
pub use retry::{BuildError, RetryPolicy, RetryPolicyBuilder};
pub use routing::{Platform, Region};
pub use services::{
    Account, AccountService, ChampionAsset, CurrentGame, DataDragonConfig, DataDragonService, Division,
    FeaturedGames, ItemAsset, LeagueEntry, LeagueService, Match, MatchHistoryOptions, MatchService,
    RuneAsset, SpectatorService, Summoner, SummonerService, SummonerSpellAsset, Tier,
};
pub use sleeper::{ClockSleeper, InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
