use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::debug;

use crate::riot_api::ApiError;

pub const RIOT_TOKEN_HEADER: &str = "x-riot-token";
const CLIENT_USER_AGENT: &str = concat!("lol_match_export/", env!("CARGO_PKG_VERSION"));

pub fn http_client(api_key: &str, timeout: Duration) -> Result<Client> {
    let mut token = HeaderValue::from_str(api_key.trim())
        .map_err(|_| anyhow!("api key contains characters not allowed in a header"))?;
    token.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(RIOT_TOKEN_HEADER, token);
    headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

    Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .context("failed to build http client")
}

pub fn fetch_text(client: &Client, url: Url) -> Result<String, ApiError> {
    debug!(%url, "GET");
    let resp = client
        .get(url.clone())
        .send()
        .map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
    let status = resp.status();
    let body = resp.text().map_err(|source| ApiError::Transport {
        url: url.to_string(),
        source,
    })?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            url: url.to_string(),
            body: truncate_body(&body),
        });
    }
    Ok(body)
}

fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    let trimmed = body.trim();
    if trimmed.chars().count() <= MAX_CHARS {
        return trimmed.to_string();
    }
    let mut out = trimmed.chars().take(MAX_CHARS).collect::<String>();
    out.push_str("...");
    out
}
