use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_HOST: &str = "api-football-v1.p.rapidapi.com";
pub const DEFAULT_BASE_URL: &str = "https://api-football-v1.p.rapidapi.com/v3";
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: Option<String>,
    pub api_host: String,
    pub base_url: String,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let api_key = env::var("RAPIDAPI_KEY")
            .ok()
            .map(|val| val.trim().to_string())
            .filter(|val| !val.is_empty());
        let api_host = non_empty_env("RAPIDAPI_HOST").unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        let base_url = non_empty_env("LEAGUE_LENS_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            api_key,
            api_host,
            base_url,
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub data_dir: Option<PathBuf>,
    pub start_page: Option<String>,
    pub search_debounce: Duration,
}

impl AppConfig {
    /// Reads the process environment. Call after `dotenvy` has loaded any
    /// `.env` files.
    pub fn from_env() -> Self {
        let search_debounce_ms = env::var("SEARCH_DEBOUNCE_MS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS)
            .max(50);
        Self {
            api: ApiConfig::from_env(),
            data_dir: non_empty_env("LEAGUE_LENS_DATA_DIR").map(PathBuf::from),
            start_page: non_empty_env("LEAGUE_LENS_PAGE"),
            search_debounce: Duration::from_millis(search_debounce_ms),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|val| !val.trim().is_empty())
}
