//! summoner-v4 (platform routing).

use super::{fetch, segment};
use crate::dispatcher::{Dispatcher, RequestOptions};
use crate::error::ApiError;
use crate::Either;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summoner {
    pub puuid: String,
    pub profile_icon_id: i64,
    /// Epoch millis of the last profile change.
    pub revision_date: i64,
    pub summoner_level: i64,
}

#[derive(Debug, Clone)]
pub struct SummonerService {
    dispatcher: Arc<Dispatcher>,
}

impl SummonerService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn summoner_by_puuid(&self, puuid: &str) -> Either<ApiError, Summoner> {
        let path = format!("/lol/summoner/v4/summoners/by-puuid/{}", segment(puuid));
        fetch(&self.dispatcher, &path, &RequestOptions::default(), "Summoner").await
    }
}
