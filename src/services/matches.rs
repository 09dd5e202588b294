//! match-v5 (regional routing) plus a few composite lookups built on it.

use super::{fetch, segment};
use crate::dispatcher::{Dispatcher, RequestOptions};
use crate::error::ApiError;
use crate::Either;
use chrono::{DateTime, TimeZone, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Page size used by [`MatchService::recent_matches`] callers that have no preference.
pub const DEFAULT_RECENT_COUNT: u32 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub data_version: String,
    pub match_id: String,
    /// Participant PUUIDs.
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ban {
    pub champion_id: i64,
    pub pick_turn: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Objective {
    pub first: bool,
    pub kills: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objectives {
    pub baron: Objective,
    pub champion: Objective,
    pub dragon: Objective,
    #[serde(default)]
    pub horde: Option<Objective>,
    pub inhibitor: Objective,
    pub rift_herald: Objective,
    pub tower: Objective,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub bans: Vec<Ban>,
    pub objectives: Objectives,
    pub team_id: i64,
    pub win: bool,
}

/// The commonly used subset of a participant's end-of-game stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchParticipant {
    pub puuid: String,
    pub participant_id: i32,
    pub team_id: i64,
    pub champion_id: i64,
    pub champion_name: String,
    #[serde(default)]
    pub team_position: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    #[serde(default)]
    pub total_minions_killed: u32,
    #[serde(default)]
    pub gold_earned: u32,
    pub win: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    /// Epoch millis.
    pub game_creation: i64,
    /// Seconds.
    pub game_duration: i64,
    pub game_end_timestamp: i64,
    pub game_id: i64,
    pub game_mode: String,
    pub game_name: String,
    pub game_start_timestamp: i64,
    pub game_type: String,
    pub game_version: String,
    pub map_id: i64,
    pub platform_id: String,
    pub queue_id: i64,
    #[serde(default)]
    pub tournament_code: Option<String>,
    pub teams: Vec<Team>,
    pub participants: Vec<MatchParticipant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

impl Match {
    pub fn participant(&self, puuid: &str) -> Option<&MatchParticipant> {
        self.info.participants.iter().find(|p| p.puuid == puuid)
    }

    pub fn duration_minutes(&self) -> i64 {
        self.info.game_duration.div_euclid(60)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.info.game_creation).single()
    }
}

/// Filters for the match-id listing. Unset fields are left out of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchHistoryOptions {
    pub start: Option<u32>,
    pub count: Option<u32>,
    /// Epoch seconds.
    pub start_time: Option<i64>,
    /// Epoch seconds.
    pub end_time: Option<i64>,
    pub queue: Option<u32>,
    /// `ranked`, `normal`, `tourney` or `tutorial`.
    pub match_type: Option<String>,
}

impl MatchHistoryOptions {
    fn to_request_options(&self) -> RequestOptions {
        RequestOptions::new()
            .query_opt("start", self.start)
            .query_opt("count", self.count)
            .query_opt("startTime", self.start_time)
            .query_opt("endTime", self.end_time)
            .query_opt("queue", self.queue)
            .query_opt("type", self.match_type.as_deref())
    }
}

#[derive(Debug, Clone)]
pub struct MatchService {
    dispatcher: Arc<Dispatcher>,
}

impl MatchService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn match_by_id(&self, match_id: &str) -> Either<ApiError, Match> {
        let path = format!("/lol/match/v5/matches/{}", segment(match_id));
        fetch(&self.dispatcher, &path, &RequestOptions::default(), "Match").await
    }

    pub async fn match_ids_by_puuid(
        &self,
        puuid: &str,
        options: &MatchHistoryOptions,
    ) -> Either<ApiError, Vec<String>> {
        let path = format!("/lol/match/v5/matches/by-puuid/{}/ids", segment(puuid));
        fetch(&self.dispatcher, &path, &options.to_request_options(), "Match history").await
    }

    /// Fetch every id concurrently and keep the ones that succeeded, in input order.
    ///
    /// Individual failures are logged and dropped; this never returns `Left`.
    pub async fn matches_by_ids(&self, match_ids: &[String]) -> Either<ApiError, Vec<Match>> {
        let results = join_all(match_ids.iter().map(|id| self.match_by_id(id))).await;

        let mut matches = Vec::with_capacity(results.len());
        let mut failed = 0usize;
        for (id, result) in match_ids.iter().zip(results) {
            match result {
                Either::Right(found) => matches.push(found),
                Either::Left(err) => {
                    failed += 1;
                    tracing::warn!(match_id = %id, status = err.status, error = %err, "match fetch failed");
                }
            }
        }
        if failed > 0 {
            tracing::warn!(failed, fetched = matches.len(), "some matches could not be fetched");
        }
        Either::Right(matches)
    }

    async fn matches_for(&self, puuid: &str, options: MatchHistoryOptions) -> Either<ApiError, Vec<Match>> {
        match self.match_ids_by_puuid(puuid, &options).await {
            Either::Left(err) => Either::Left(err),
            Either::Right(ids) => self.matches_by_ids(&ids).await,
        }
    }

    /// Latest `count` matches (see [`DEFAULT_RECENT_COUNT`]).
    pub async fn recent_matches(&self, puuid: &str, count: u32) -> Either<ApiError, Vec<Match>> {
        self.matches_for(puuid, MatchHistoryOptions { count: Some(count), ..Default::default() }).await
    }

    /// Matches played between two epoch-second timestamps.
    pub async fn matches_in_time_range(
        &self,
        puuid: &str,
        start_time: i64,
        end_time: i64,
    ) -> Either<ApiError, Vec<Match>> {
        let options = MatchHistoryOptions {
            start_time: Some(start_time),
            end_time: Some(end_time),
            ..Default::default()
        };
        self.matches_for(puuid, options).await
    }

    pub async fn matches_by_queue(&self, puuid: &str, queue_id: u32) -> Either<ApiError, Vec<Match>> {
        self.matches_for(puuid, MatchHistoryOptions { queue: Some(queue_id), ..Default::default() }).await
    }

    /// Whole minutes, rounded down.
    pub async fn match_duration_minutes(&self, match_id: &str) -> Either<ApiError, i64> {
        self.match_by_id(match_id).await.map(|m| m.duration_minutes())
    }

    pub async fn match_creation_date(&self, match_id: &str) -> Either<ApiError, DateTime<Utc>> {
        self.match_by_id(match_id).await.and_then(|m| match m.created_at() {
            Some(at) => Either::Right(at),
            None => Either::Left(ApiError::validation(
                "Match data validation failed",
                format!("gameCreation {} is out of range", m.info.game_creation),
            )),
        })
    }
}
