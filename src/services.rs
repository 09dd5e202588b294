//! Typed views over individual Riot API endpoint families.
//!
//! Each service borrows a shared [`Dispatcher`] and turns JSON bodies into DTOs. A body that
//! does not match the DTO becomes an [`ApiError`] with status 400 / `"Validation Error"`.

pub mod account;
pub mod data_dragon;
pub mod league;
pub mod matches;
pub mod spectator;
pub mod summoner;

pub use account::{Account, AccountService};
pub use data_dragon::{
    AssetImage, ChampionAsset, DataDragonConfig, DataDragonService, ItemAsset, RuneAsset, SummonerSpellAsset,
};
pub use league::{Division, LeagueEntry, LeagueService, MiniSeries, Tier};
pub use matches::{Match, MatchHistoryOptions, MatchInfo, MatchMetadata, MatchService};
pub use spectator::{CurrentGame, FeaturedGames, SpectatorService};
pub use summoner::{Summoner, SummonerService};

use crate::dispatcher::{Dispatcher, RequestOptions};
use crate::error::ApiError;
use crate::Either;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Percent-encode one path segment (Riot IDs may contain spaces and non-ASCII).
pub(crate) fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// GET `path`, then decode the payload into `T`, labelling shape mismatches with `what`.
pub(crate) async fn fetch<T: DeserializeOwned>(
    dispatcher: &Dispatcher,
    path: &str,
    options: &RequestOptions,
    what: &str,
) -> Either<ApiError, T> {
    dispatcher
        .get_with::<Value>(path, options)
        .await
        .and_then(|response| validate(response.data, what))
}

/// Decode an already fetched payload, labelling shape mismatches with `what`.
pub(crate) fn validate<T: DeserializeOwned>(value: Value, what: &str) -> Either<ApiError, T> {
    match serde_json::from_value::<T>(value) {
        Ok(data) => Either::Right(data),
        Err(err) => {
            tracing::debug!(what, error = %err, "payload did not match dto");
            Either::Left(ApiError::validation(format!("{what} data validation failed"), err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(segment("Faker"), "Faker");
        assert_eq!(segment("Hide on bush"), "Hide%20on%20bush");
        assert_eq!(segment("a/b#c"), "a%2Fb%23c");
    }
}
