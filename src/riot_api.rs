use std::fmt;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config::ApiConfig;
use crate::http_client::{fetch_text, http_client};

/// One entry of `info.participants`, kept as raw JSON so any attribute name
/// can be projected. A non-object entry still yields a row of empty cells.
pub type ParticipantRecord = Value;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("http {status} from {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },
    #[error("invalid {what} json: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("{what} response has no `{field}`")]
    MissingField {
        what: &'static str,
        field: &'static str,
    },
    #[error("cannot build request url: {0}")]
    Url(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Regional routing clusters serving the account and match-v5 endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RoutingRegion {
    Americas,
    Asia,
    Europe,
    Sea,
}

impl RoutingRegion {
    pub fn host(self) -> &'static str {
        match self {
            RoutingRegion::Americas => "americas.api.riotgames.com",
            RoutingRegion::Asia => "asia.api.riotgames.com",
            RoutingRegion::Europe => "europe.api.riotgames.com",
            RoutingRegion::Sea => "sea.api.riotgames.com",
        }
    }

    pub fn base_url(self) -> Result<Url> {
        Url::parse(&format!("https://{}/", self.host()))
            .with_context(|| format!("invalid base url for region {self}"))
    }
}

impl fmt::Display for RoutingRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoutingRegion::Americas => "americas",
            RoutingRegion::Asia => "asia",
            RoutingRegion::Europe => "europe",
            RoutingRegion::Sea => "sea",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchRecord {
    #[serde(default)]
    pub metadata: MatchMetadata,
    pub info: MatchInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchMetadata {
    #[serde(rename = "matchId", default)]
    pub match_id: String,
    #[serde(default)]
    pub participants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchInfo {
    pub participants: Vec<ParticipantRecord>,
    /// Every other `info` field (`gameMode`, `queueId`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct AccountDto {
    #[serde(default)]
    puuid: Option<String>,
}

/// The three remote calls the export pipeline needs.
pub trait MatchApi {
    fn account_puuid(&self, game_name: &str, tag_line: &str) -> Result<String, ApiError>;

    fn match_ids_page(
        &self,
        puuid: &str,
        start: usize,
        count: usize,
    ) -> Result<Vec<String>, ApiError>;

    fn match_record(&self, match_id: &str) -> Result<MatchRecord, ApiError>;
}

pub struct RiotClient {
    client: Client,
    base: Url,
    queue: Option<u32>,
}

impl RiotClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = http_client(&config.api_key, config.timeout)?;
        Ok(Self {
            client,
            base: config.region.base_url()?,
            queue: config.queue,
        })
    }

    pub fn account_url(&self, game_name: &str, tag_line: &str) -> Result<Url, ApiError> {
        self.endpoint(&[
            "riot",
            "account",
            "v1",
            "accounts",
            "by-riot-id",
            game_name,
            tag_line,
        ])
    }

    pub fn match_ids_url(&self, puuid: &str, start: usize, count: usize) -> Result<Url, ApiError> {
        let mut url = self.endpoint(&["lol", "match", "v5", "matches", "by-puuid", puuid, "ids"])?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("start", &start.to_string())
                .append_pair("count", &count.to_string());
            if let Some(queue) = self.queue {
                query.append_pair("queue", &queue.to_string());
            }
        }
        Ok(url)
    }

    pub fn match_url(&self, match_id: &str) -> Result<Url, ApiError> {
        self.endpoint(&["lol", "match", "v5", "matches", match_id])
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(format!("{} cannot be a base", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl MatchApi for RiotClient {
    fn account_puuid(&self, game_name: &str, tag_line: &str) -> Result<String, ApiError> {
        let url = self.account_url(game_name, tag_line)?;
        let body = fetch_text(&self.client, url)?;
        parse_account_json(&body)
    }

    fn match_ids_page(
        &self,
        puuid: &str,
        start: usize,
        count: usize,
    ) -> Result<Vec<String>, ApiError> {
        let url = self.match_ids_url(puuid, start, count)?;
        let body = fetch_text(&self.client, url)?;
        parse_match_ids_json(&body)
    }

    fn match_record(&self, match_id: &str) -> Result<MatchRecord, ApiError> {
        let url = self.match_url(match_id)?;
        let body = fetch_text(&self.client, url)?;
        parse_match_json(&body)
    }
}

/// Resolves a Riot ID (`gameName#tagLine`) to its PUUID. Any failure here is
/// fatal for the run.
pub fn resolve_puuid<A: MatchApi + ?Sized>(
    api: &A,
    game_name: &str,
    tag_line: &str,
) -> Result<String> {
    let puuid = api
        .account_puuid(game_name, tag_line)
        .with_context(|| format!("failed to resolve riot id {game_name}#{tag_line}"))?;
    if puuid.trim().is_empty() {
        return Err(anyhow!("riot id {game_name}#{tag_line} resolved to an empty puuid"));
    }
    Ok(puuid)
}

pub fn parse_account_json(raw: &str) -> Result<String, ApiError> {
    let account: AccountDto = serde_json::from_str(raw.trim()).map_err(|source| ApiError::Decode {
        what: "account",
        source,
    })?;
    account
        .puuid
        .filter(|puuid| !puuid.trim().is_empty())
        .ok_or(ApiError::MissingField {
            what: "account",
            field: "puuid",
        })
}

pub fn parse_match_ids_json(raw: &str) -> Result<Vec<String>, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    serde_json::from_str(trimmed).map_err(|source| ApiError::Decode {
        what: "match id list",
        source,
    })
}

pub fn parse_match_json(raw: &str) -> Result<MatchRecord, ApiError> {
    serde_json::from_str(raw.trim()).map_err(|source| ApiError::Decode {
        what: "match",
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn client(queue: Option<u32>) -> RiotClient {
        RiotClient::new(&ApiConfig {
            api_key: "RGAPI-test".to_string(),
            region: RoutingRegion::Europe,
            timeout: Duration::from_secs(5),
            queue,
        })
        .expect("client should build")
    }

    #[test]
    fn account_url_encodes_riot_id() {
        let url = client(None)
            .account_url("euclidean aatrox", "EUW")
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://europe.api.riotgames.com/riot/account/v1/accounts/by-riot-id/euclidean%20aatrox/EUW"
        );
    }

    #[test]
    fn match_ids_url_carries_paging_and_queue() {
        let url = client(Some(420)).match_ids_url("P1", 200, 100).expect("url");
        assert_eq!(
            url.as_str(),
            "https://europe.api.riotgames.com/lol/match/v5/matches/by-puuid/P1/ids?start=200&count=100&queue=420"
        );
    }

    #[test]
    fn match_url_uses_match_id_segment() {
        let url = client(None).match_url("EUW1_7000000001").expect("url");
        assert_eq!(
            url.as_str(),
            "https://europe.api.riotgames.com/lol/match/v5/matches/EUW1_7000000001"
        );
    }

    #[test]
    fn account_without_puuid_is_missing_field() {
        let err = parse_account_json(r#"{"gameName":"x","tagLine":"y"}"#).unwrap_err();
        assert!(matches!(
            err,
            ApiError::MissingField {
                field: "puuid",
                ..
            }
        ));
    }

    #[test]
    fn match_ids_null_is_empty() {
        assert!(parse_match_ids_json("null").expect("null should parse").is_empty());
        assert!(parse_match_ids_json("[]").expect("[] should parse").is_empty());
    }

    #[test]
    fn non_object_participant_does_not_fail_the_match() {
        let record = parse_match_json(
            r#"{"metadata":{},"info":{"participants":[{"kills":1},null,{"kills":3}]}}"#,
        )
        .expect("match with a null participant should parse");
        assert_eq!(record.info.participants.len(), 3);
        assert!(record.info.participants[1].is_null());
    }

    #[test]
    fn match_without_info_is_decode_error() {
        let err = parse_match_json(r#"{"metadata":{"matchId":"X"}}"#).unwrap_err();
        assert!(matches!(err, ApiError::Decode { what: "match", .. }));
    }

    #[test]
    fn region_display_matches_cli_value() {
        assert_eq!(RoutingRegion::Sea.to_string(), "sea");
        assert_eq!(RoutingRegion::Americas.host(), "americas.api.riotgames.com");
    }
}
