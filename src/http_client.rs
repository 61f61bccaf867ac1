use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;

use crate::config::ApiConfig;
use crate::error::LensError;

const REQUEST_TIMEOUT_SECS: u64 = 10;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

/// GET `path` under the configured base url with the RapidAPI headers and
/// return the body text. Non-success statuses become `LensError::HttpStatus`.
pub fn get_api_json(api: &ApiConfig, path: &str, query: &[(&str, String)]) -> Result<String> {
    let key = api.api_key.as_deref().ok_or(LensError::MissingApiKey)?;
    let client = http_client()?;
    let url = api.endpoint(path);

    let resp = client
        .get(&url)
        .query(query)
        .header(USER_AGENT, "league_lens")
        .header("X-RapidAPI-Key", key)
        .header("X-RapidAPI-Host", api.api_host.as_str())
        .send()
        .map_err(|err| LensError::Network {
            endpoint: path.to_string(),
            reason: err.to_string(),
        })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(LensError::HttpStatus {
            endpoint: path.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let body = resp.text().map_err(|err| LensError::Network {
        endpoint: path.to_string(),
        reason: err.to_string(),
    })?;
    Ok(body)
}
