//! Platform and regional routing values.
//!
//! Summoner, league and spectator endpoints live on a *platform* host (`na1`, `euw1`, ...).
//! Account and match endpoints live on a *regional* host (`americas`, `europe`, ...).

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn host_for(route: &str) -> String {
    format!("https://{route}.api.riotgames.com")
}

/// Platform routing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Br1,
    Eun1,
    Euw1,
    Jp1,
    Kr,
    La1,
    La2,
    #[default]
    Na1,
    Oc1,
    Ph2,
    Ru,
    Sg2,
    Th2,
    Tr1,
    Tw2,
    Vn2,
}

impl Platform {
    pub const ALL: [Platform; 16] = [
        Platform::Br1,
        Platform::Eun1,
        Platform::Euw1,
        Platform::Jp1,
        Platform::Kr,
        Platform::La1,
        Platform::La2,
        Platform::Na1,
        Platform::Oc1,
        Platform::Ph2,
        Platform::Ru,
        Platform::Sg2,
        Platform::Th2,
        Platform::Tr1,
        Platform::Tw2,
        Platform::Vn2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Br1 => "br1",
            Platform::Eun1 => "eun1",
            Platform::Euw1 => "euw1",
            Platform::Jp1 => "jp1",
            Platform::Kr => "kr",
            Platform::La1 => "la1",
            Platform::La2 => "la2",
            Platform::Na1 => "na1",
            Platform::Oc1 => "oc1",
            Platform::Ph2 => "ph2",
            Platform::Ru => "ru",
            Platform::Sg2 => "sg2",
            Platform::Th2 => "th2",
            Platform::Tr1 => "tr1",
            Platform::Tw2 => "tw2",
            Platform::Vn2 => "vn2",
        }
    }

    pub fn host(self) -> String {
        host_for(self.as_str())
    }

    /// Regional cluster serving this platform's account and match data.
    pub fn region(self) -> Region {
        match self {
            Platform::Na1 | Platform::La1 | Platform::La2 | Platform::Br1 => Region::Americas,
            Platform::Euw1 | Platform::Eun1 | Platform::Tr1 | Platform::Ru => Region::Europe,
            Platform::Kr | Platform::Jp1 => Region::Asia,
            Platform::Oc1
            | Platform::Ph2
            | Platform::Sg2
            | Platform::Th2
            | Platform::Tw2
            | Platform::Vn2 => Region::Sea,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownPlatform(s.to_string()))
    }
}

/// Regional routing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    #[default]
    Americas,
    Asia,
    Europe,
    Sea,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Americas, Region::Asia, Region::Europe, Region::Sea];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::Americas => "americas",
            Region::Asia => "asia",
            Region::Europe => "europe",
            Region::Sea => "sea",
        }
    }

    pub fn host(self) -> String {
        host_for(self.as_str())
    }

    /// Platform picked when only a region is known.
    pub fn default_platform(self) -> Platform {
        match self {
            Region::Americas => Platform::Na1,
            Region::Europe => Platform::Euw1,
            Region::Asia => Platform::Kr,
            Region::Sea => Platform::Sg2,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Region::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ConfigError::UnknownRegion(s.to_string()))
    }
}
