//! Data Dragon static assets (champions, items, runes, summoner spells, images).
//!
//! Data Dragon lives on its own CDN host, so every call passes an absolute URL through the
//! dispatcher. Those calls are counted by that dispatcher's limiter like any other request.
//! Nothing is cached.

use super::{fetch, segment, validate};
use crate::dispatcher::{Dispatcher, RequestOptions};
use crate::error::ApiError;
use crate::Either;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DDRAGON_BASE_URL: &str = "https://ddragon.leagueoflegends.com";
pub const DEFAULT_VERSION: &str = "latest";
pub const DEFAULT_LANGUAGE: &str = "en_US";

/// Where and in which locale assets are fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DataDragonConfig {
    pub version: String,
    pub language: String,
    pub base_url: String,
    /// Image helpers return absolute CDN URLs instead of bare asset paths.
    pub include_full_url: bool,
}

impl Default for DataDragonConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.into(),
            language: DEFAULT_LANGUAGE.into(),
            base_url: DDRAGON_BASE_URL.into(),
            include_full_url: false,
        }
    }
}

impl DataDragonConfig {
    /// Blank fields fall back to their defaults.
    fn normalized(mut self) -> Self {
        let defaults = Self::default();
        if self.version.trim().is_empty() {
            self.version = defaults.version;
        }
        if self.language.trim().is_empty() {
            self.language = defaults.language;
        }
        let base_url = self.base_url.trim().trim_end_matches('/');
        self.base_url = if base_url.is_empty() { defaults.base_url } else { base_url.to_string() };
        self
    }
}

/// Sprite reference shared by every asset kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetImage {
    pub full: String,
    pub sprite: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionSkin {
    pub id: String,
    pub num: i64,
    pub name: String,
    pub chromas: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionSpell {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tooltip: String,
    pub image: AssetImage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChampionPassive {
    pub name: String,
    pub description: String,
    pub image: AssetImage,
}

/// Champion summary (`champion.json`) or full record (`champion/{id}.json`).
///
/// Fields not modelled here (stats, tags, lore, ...) are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChampionAsset {
    pub id: String,
    pub key: String,
    pub name: String,
    pub title: String,
    pub image: AssetImage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skins: Option<Vec<ChampionSkin>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spells: Option<Vec<ChampionSpell>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passive: Option<ChampionPassive>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChampionAsset {
    /// Numeric champion id as used by match and spectator payloads.
    pub fn numeric_key(&self) -> Option<i64> {
        self.key.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGold {
    pub base: i64,
    pub total: i64,
    pub sell: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAsset {
    pub name: String,
    pub description: String,
    pub image: AssetImage,
    pub gold: ItemGold,
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rune {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub icon: String,
    pub short_desc: String,
    pub long_desc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuneSlot {
    pub runes: Vec<Rune>,
}

/// One rune path (Precision, Domination, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuneAsset {
    pub id: i64,
    pub key: String,
    pub name: String,
    pub icon: String,
    pub slots: Vec<RuneSlot>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummonerSpellAsset {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tooltip: String,
    pub image: AssetImage,
    pub cooldown: Vec<f64>,
    pub cost: Vec<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `{"type": ..., "version": ..., "data": {...}}` envelope of the per-kind data files.
#[derive(Debug, Deserialize)]
struct DataFile<T> {
    data: T,
}

#[derive(Debug, Clone)]
pub struct DataDragonService {
    dispatcher: Arc<Dispatcher>,
    config: DataDragonConfig,
}

impl DataDragonService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self::with_config(dispatcher, DataDragonConfig::default())
    }

    pub fn with_config(dispatcher: Arc<Dispatcher>, config: DataDragonConfig) -> Self {
        Self { dispatcher, config: config.normalized() }
    }

    pub fn config(&self) -> &DataDragonConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: DataDragonConfig) {
        self.config = config.normalized();
        tracing::debug!(
            version = %self.config.version,
            language = %self.config.language,
            "data dragon config updated"
        );
    }

    /// Every published version, newest first.
    pub async fn latest_versions(&self) -> Either<ApiError, Vec<String>> {
        let url = format!("{}/api/versions.json", self.config.base_url);
        fetch(&self.dispatcher, &url, &RequestOptions::default(), "Versions").await
    }

    pub async fn champions(
        &self,
        version: Option<&str>,
    ) -> Either<ApiError, BTreeMap<String, ChampionAsset>> {
        let url = self.data_url(version, "champion.json");
        let options = RequestOptions::default();
        fetch::<DataFile<BTreeMap<String, ChampionAsset>>>(&self.dispatcher, &url, &options, "Champions")
            .await
            .map(|file| file.data)
    }

    /// Full record for one champion, keyed by its string id (`"Ahri"`).
    pub async fn champion(
        &self,
        champion_id: &str,
        version: Option<&str>,
    ) -> Either<ApiError, ChampionAsset> {
        let url = self.data_url(version, &format!("champion/{}.json", segment(champion_id)));
        let options = RequestOptions::default();
        fetch::<DataFile<Map<String, Value>>>(&self.dispatcher, &url, &options, "Champion")
            .await
            .and_then(|file| match file.data.into_iter().next() {
                None => Either::Left(ApiError::not_found(format!("Champion {champion_id} not found"))),
                Some((_, Value::Null)) => {
                    Either::Left(ApiError::not_found(format!("Champion {champion_id} data is invalid")))
                }
                Some((_, value)) => validate(value, "Champion"),
            })
    }

    pub async fn items(&self, version: Option<&str>) -> Either<ApiError, BTreeMap<String, ItemAsset>> {
        let url = self.data_url(version, "item.json");
        let options = RequestOptions::default();
        fetch::<DataFile<BTreeMap<String, ItemAsset>>>(&self.dispatcher, &url, &options, "Items")
            .await
            .map(|file| file.data)
    }

    /// One item out of `item.json`; only that entry is validated.
    pub async fn item(&self, item_id: &str, version: Option<&str>) -> Either<ApiError, ItemAsset> {
        let url = self.data_url(version, "item.json");
        let options = RequestOptions::default();
        fetch::<DataFile<Map<String, Value>>>(&self.dispatcher, &url, &options, "Items")
            .await
            .and_then(|mut file| match file.data.remove(item_id) {
                None | Some(Value::Null) => {
                    Either::Left(ApiError::not_found(format!("Item with ID {item_id} not found")))
                }
                Some(value) => validate(value, "Item"),
            })
    }

    pub async fn runes(&self, version: Option<&str>) -> Either<ApiError, Vec<RuneAsset>> {
        let url = self.data_url(version, "runesReforged.json");
        fetch(&self.dispatcher, &url, &RequestOptions::default(), "Runes").await
    }

    pub async fn summoner_spells(
        &self,
        version: Option<&str>,
    ) -> Either<ApiError, BTreeMap<String, SummonerSpellAsset>> {
        let url = self.data_url(version, "summoner.json");
        fetch::<DataFile<BTreeMap<String, SummonerSpellAsset>>>(
            &self.dispatcher,
            &url,
            &RequestOptions::default(),
            "Summoner spells",
        )
            .await
            .map(|file| file.data)
    }

    /// `path` under the configured version when absolute URLs are enabled, `path` itself otherwise.
    pub fn asset_url(&self, path: &str) -> String {
        if self.config.include_full_url {
            format!("{}/cdn/{}/{}", self.config.base_url, self.config.version, path)
        } else {
            path.to_string()
        }
    }

    pub fn champion_image_url(&self, champion_id: &str, skin: Option<&str>) -> String {
        self.asset_url(&format!("img/champion/{champion_id}{}.jpg", skin_suffix(skin)))
    }

    pub fn champion_splash_url(&self, champion_id: &str, skin: Option<&str>) -> String {
        self.asset_url(&format!("img/champion/splash/{champion_id}{}.jpg", skin_suffix(skin)))
    }

    pub fn champion_loading_url(&self, champion_id: &str, skin: Option<&str>) -> String {
        self.asset_url(&format!("img/champion/loading/{champion_id}{}.jpg", skin_suffix(skin)))
    }

    pub fn item_image_url(&self, item_id: &str) -> String {
        self.asset_url(&format!("img/item/{item_id}.png"))
    }

    pub fn rune_image_url(&self, rune_id: i64) -> String {
        self.asset_url(&format!("img/{rune_id}.png"))
    }

    pub fn summoner_spell_image_url(&self, spell_id: &str) -> String {
        self.asset_url(&format!("img/spell/{spell_id}.png"))
    }

    pub fn profile_icon_url(&self, icon_id: i64) -> String {
        self.asset_url(&format!("img/profileicon/{icon_id}.png"))
    }

    fn data_url(&self, version: Option<&str>, file: &str) -> String {
        let version = version.filter(|v| !v.is_empty()).unwrap_or(&self.config.version);
        format!(
            "{}/cdn/{}/data/{}/{}",
            self.config.base_url,
            segment(version),
            segment(&self.config.language),
            file
        )
    }
}

/// Skin `0` is the base skin and carries no suffix.
fn skin_suffix(skin: Option<&str>) -> String {
    match skin {
        None | Some("") | Some("0") => String::new(),
        Some(skin) => format!("_{skin}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::DispatcherConfig;
    use crate::error::TransportError;
    use crate::transport::{HttpRequest, HttpResponse, Transport};

    #[derive(Debug)]
    struct Unreachable;

    #[async_trait::async_trait]
    impl Transport for Unreachable {
        async fn send(&self, _: &HttpRequest) -> Result<HttpResponse, TransportError> {
            Err(TransportError::NoResponse("offline".into()))
        }
    }

    fn service(config: DataDragonConfig) -> DataDragonService {
        let dispatcher = DispatcherConfig::builder("https://na1.api.riotgames.com", "k")
            .build()
            .unwrap();
        let dispatcher = Arc::new(Dispatcher::with_transport(dispatcher, Unreachable));
        DataDragonService::with_config(dispatcher, config)
    }

    #[test]
    fn blank_config_falls_back_to_defaults() {
        let config = DataDragonConfig {
            version: " ".into(),
            language: String::new(),
            base_url: "https://cdn.example.com/".into(),
            include_full_url: true,
        };
        let service = service(config);
        assert_eq!(service.config().version, DEFAULT_VERSION);
        assert_eq!(service.config().language, DEFAULT_LANGUAGE);
        assert_eq!(service.config().base_url, "https://cdn.example.com");
    }

    #[test]
    fn image_paths_are_relative_by_default() {
        let service = service(DataDragonConfig::default());
        assert_eq!(service.champion_image_url("Ahri", None), "img/champion/Ahri.jpg");
        assert_eq!(service.champion_image_url("Ahri", Some("0")), "img/champion/Ahri.jpg");
        assert_eq!(service.champion_splash_url("Ahri", Some("3")), "img/champion/splash/Ahri_3.jpg");
        assert_eq!(service.champion_loading_url("Ahri", Some("")), "img/champion/loading/Ahri.jpg");
        assert_eq!(service.item_image_url("1055"), "img/item/1055.png");
        assert_eq!(service.rune_image_url(8112), "img/8112.png");
        assert_eq!(service.summoner_spell_image_url("SummonerFlash"), "img/spell/SummonerFlash.png");
    }

    #[test]
    fn full_urls_include_host_and_version() {
        let mut service = service(DataDragonConfig::default());
        service.update_config(DataDragonConfig {
            version: "14.1.1".into(),
            include_full_url: true,
            ..DataDragonConfig::default()
        });
        assert_eq!(
            service.profile_icon_url(29),
            "https://ddragon.leagueoflegends.com/cdn/14.1.1/img/profileicon/29.png"
        );
    }

    #[test]
    fn config_deserializes_with_missing_fields() {
        let config: DataDragonConfig = serde_json::from_str(r#"{"language":"ko_KR"}"#).unwrap();
        assert_eq!(config.language, "ko_KR");
        assert_eq!(config.version, DEFAULT_VERSION);
        assert!(!config.include_full_url);
    }

    #[test]
    fn champion_keeps_unmodelled_fields() {
        let champion: ChampionAsset = serde_json::from_value(serde_json::json!({
            "id": "Ahri", "key": "103", "name": "Ahri", "title": "the Nine-Tailed Fox",
            "image": {"full": "Ahri.png", "sprite": "champion0.png", "group": "champion"},
            "tags": ["Mage", "Assassin"]
        }))
        .unwrap();
        assert_eq!(champion.numeric_key(), Some(103));
        assert!(champion.skins.is_none());
        assert_eq!(champion.extra.get("tags"), Some(&serde_json::json!(["Mage", "Assassin"])));
    }
}
