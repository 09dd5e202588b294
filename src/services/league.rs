//! league-v4 (platform routing).

use super::{fetch, segment};
use crate::dispatcher::{Dispatcher, RequestOptions};
use crate::error::ApiError;
use crate::Either;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Ranked tier, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    /// Master and above: a single ladder with no divisions.
    pub fn is_apex(self) -> bool {
        self >= Tier::Master
    }
}

/// Division inside a tier. Apex tiers report an empty string on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(clippy::upper_case_acronyms)]
pub enum Division {
    #[serde(rename = "")]
    Apex,
    I,
    II,
    III,
    IV,
    V,
}

impl fmt::Display for Division {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Division::Apex => "",
            Division::I => "I",
            Division::II => "II",
            Division::III => "III",
            Division::IV => "IV",
            Division::V => "V",
        };
        f.write_str(text)
    }
}

/// Promotion series state (legacy; absent on most entries).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniSeries {
    pub losses: u32,
    pub progress: String,
    pub target: u32,
    pub wins: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueEntry {
    pub league_id: String,
    pub puuid: String,
    pub queue_type: String,
    pub tier: Tier,
    pub rank: Division,
    pub league_points: i32,
    pub wins: u32,
    pub losses: u32,
    pub hot_streak: bool,
    pub veteran: bool,
    pub fresh_blood: bool,
    pub inactive: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mini_series: Option<MiniSeries>,
}

impl LeagueEntry {
    /// Share of games won, `0.0` when no games were played.
    pub fn win_rate(&self) -> f64 {
        let games = u64::from(self.wins) + u64::from(self.losses);
        if games == 0 {
            0.0
        } else {
            f64::from(self.wins) / games as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeagueService {
    dispatcher: Arc<Dispatcher>,
}

impl LeagueService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Every ranked queue entry for a player; an unranked player yields an empty list.
    pub async fn entries_by_puuid(&self, puuid: &str) -> Either<ApiError, Vec<LeagueEntry>> {
        let path = format!("/lol/league/v4/entries/by-puuid/{}", segment(puuid));
        fetch(&self.dispatcher, &path, &RequestOptions::default(), "League entries").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTRY: &str = r#"{
        "leagueId": "l-1", "puuid": "p", "queueType": "RANKED_SOLO_5x5",
        "tier": "GOLD", "rank": "II", "leaguePoints": 57, "wins": 30, "losses": 10,
        "hotStreak": false, "veteran": false, "freshBlood": true, "inactive": false
    }"#;

    #[test]
    fn decodes_entry_with_division() {
        let entry: LeagueEntry = serde_json::from_str(ENTRY).unwrap();
        assert_eq!(entry.tier, Tier::Gold);
        assert_eq!(entry.rank, Division::II);
        assert!(entry.mini_series.is_none());
        assert!((entry.win_rate() - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn apex_tier_has_empty_division() {
        let json = ENTRY.replace(r#""GOLD""#, r#""CHALLENGER""#).replace(r#""II""#, r#""""#);
        let entry: LeagueEntry = serde_json::from_str(&json).unwrap();
        assert!(entry.tier.is_apex());
        assert_eq!(entry.rank, Division::Apex);
        assert_eq!(entry.rank.to_string(), "");
    }

    #[test]
    fn unknown_tier_is_rejected() {
        let json = ENTRY.replace(r#""GOLD""#, r#""WOOD""#);
        assert!(serde_json::from_str::<LeagueEntry>(&json).is_err());
    }

    #[test]
    fn win_rate_handles_huge_counts() {
        let mut entry: LeagueEntry = serde_json::from_str(ENTRY).unwrap();
        entry.wins = u32::MAX;
        entry.losses = u32::MAX;
        assert!((entry.win_rate() - 0.5).abs() < 1e-9);
        entry.wins = 0;
        entry.losses = 0;
        assert_eq!(entry.win_rate(), 0.0);
    }

    #[test]
    fn tiers_are_ordered() {
        assert!(Tier::Iron < Tier::Diamond);
        assert!(!Tier::Diamond.is_apex());
    }
}
