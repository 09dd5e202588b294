//! spectator-v5 (platform routing).

use super::{fetch, segment};
use crate::dispatcher::{Dispatcher, RequestOptions};
use crate::error::ApiError;
use crate::Either;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BannedChampion {
    pub champion_id: i64,
    pub team_id: i64,
    pub pick_turn: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observer {
    pub encryption_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCustomizationObject {
    pub category: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Perks {
    pub perk_ids: Vec<i64>,
    pub perk_style: i64,
    pub perk_sub_style: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectatorParticipant {
    pub champion_id: i64,
    pub profile_icon_id: i64,
    pub bot: bool,
    pub team_id: i64,
    pub puuid: Option<String>,
    pub spell1_id: i64,
    pub spell2_id: i64,
    #[serde(default)]
    pub perks: Option<Perks>,
    #[serde(default)]
    pub game_customization_objects: Vec<GameCustomizationObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentGame {
    pub game_id: i64,
    pub game_type: String,
    pub game_start_time: i64,
    pub map_id: i64,
    /// Seconds since the game started.
    pub game_length: i64,
    pub platform_id: String,
    pub game_mode: String,
    pub banned_champions: Vec<BannedChampion>,
    pub game_queue_config_id: Option<i64>,
    pub observers: Observer,
    pub participants: Vec<SpectatorParticipant>,
    #[serde(default)]
    pub game_customization_objects: Vec<GameCustomizationObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedGameInfo {
    pub game_id: i64,
    pub game_mode: String,
    pub game_type: String,
    pub game_length: i64,
    pub map_id: i64,
    pub platform_id: String,
    pub banned_champions: Vec<BannedChampion>,
    pub game_queue_config_id: Option<i64>,
    pub observers: Observer,
    pub participants: Vec<SpectatorParticipant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturedGames {
    pub game_list: Vec<FeaturedGameInfo>,
    /// Suggested seconds between polls.
    #[serde(default)]
    pub client_refresh_interval: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct SpectatorService {
    dispatcher: Arc<Dispatcher>,
}

impl SpectatorService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Live game for a player. A player not in game comes back as a 404 `ApiError`.
    pub async fn active_game_by_puuid(&self, puuid: &str) -> Either<ApiError, CurrentGame> {
        let path = format!("/lol/spectator/v5/active-games/by-summoner/{}", segment(puuid));
        fetch(&self.dispatcher, &path, &RequestOptions::default(), "Current game").await
    }

    pub async fn featured_games(&self) -> Either<ApiError, FeaturedGames> {
        fetch(
            &self.dispatcher,
            "/lol/spectator/v5/featured-games",
            &RequestOptions::default(),
            "Featured games",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn featured_games_refresh_interval_is_optional() {
        let games: FeaturedGames = serde_json::from_str(r#"{"gameList":[]}"#).unwrap();
        assert!(games.game_list.is_empty());
        assert_eq!(games.client_refresh_interval, None);
    }

    #[test]
    fn participant_without_perks_decodes() {
        let participant: SpectatorParticipant = serde_json::from_str(
            r#"{"championId":1,"profileIconId":2,"bot":false,"teamId":100,"puuid":"p","spell1Id":4,"spell2Id":14}"#,
        )
        .unwrap();
        assert!(participant.perks.is_none());
        assert!(participant.game_customization_objects.is_empty());
    }
}
