//! account-v1 (regional routing).

use super::{fetch, segment};
use crate::dispatcher::{Dispatcher, RequestOptions};
use crate::error::ApiError;
use crate::Either;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub puuid: String,
    pub game_name: String,
    pub tag_line: String,
}

impl Account {
    /// `gameName#tagLine`.
    pub fn riot_id(&self) -> String {
        format!("{}#{}", self.game_name, self.tag_line)
    }
}

#[derive(Debug, Clone)]
pub struct AccountService {
    dispatcher: Arc<Dispatcher>,
}

impl AccountService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn account_by_puuid(&self, puuid: &str) -> Either<ApiError, Account> {
        let path = format!("/riot/account/v1/accounts/by-puuid/{}", segment(puuid));
        fetch(&self.dispatcher, &path, &RequestOptions::default(), "Account").await
    }

    pub async fn account_by_riot_id(&self, game_name: &str, tag_line: &str) -> Either<ApiError, Account> {
        let path = format!(
            "/riot/account/v1/accounts/by-riot-id/{}/{}",
            segment(game_name),
            segment(tag_line)
        );
        fetch(&self.dispatcher, &path, &RequestOptions::default(), "Account").await
    }
}
