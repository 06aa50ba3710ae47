//! Checklist configuration.
//!
//! A repository may carry a `.review-checklist.json` at its root:
//!
//! ```json
//! {
//!   "checklist": [
//!     "FE: works in a mobile browser",
//!     "BE: queries are optimized"
//!   ],
//!   "defaultStatus": false
//! }
//! ```
//!
//! `defaultStatus` is `true` (checked), `false` (not checked) or `null` (N/A).
//! The file is read once per page load through Gitiles. Every failure falls back to
//! [`DEFAULT_CHECKLIST`] with all items N/A.

use std::fmt;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use regex::Regex;
use serde::Deserialize;

use crate::checklist::TriState;

pub const DEFAULT_CHECKLIST: [&str; 5] = [
    "Changeset checked out and tried",
    "Commit message test plan is sufficient for manual sanity checking",
    "Automated tests cover all necessary cases",
    "User-facing strings/dates/times/numbers are internationalized",
    "UI interactions are accessible to screen reader, keyboard only, and visually impaired users",
];

const DEFAULT_GITILES_BASE: &str = "https://gerrit.instructure.com/plugins/gitiles";
const DEFAULT_BRANCH: &str = "master";
const DEFAULT_CONFIG_FILE: &str = ".review-checklist.json";
const DEFAULT_FETCH_TIMEOUT_MS: u32 = 5_000;

// Change URLs look like `/c/<repo>/+/<change>`; repos may contain slashes.
static REPOSITORY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/c/(.*)/\+").expect("valid repository pattern"));

/// Build- and run-time settings.
///
/// Defaults can be overridden at build time with the `REVIEW_CHECKLIST_GITILES_BASE`,
/// `REVIEW_CHECKLIST_BRANCH` and `REVIEW_CHECKLIST_FILE` environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub gitiles_base: String,
    pub branch: String,
    pub config_file: String,
    pub fetch_timeout_ms: u32,
    pub fallback_items: Vec<String>,
    /// Keep text already present in a freshly rendered Gerrit textarea instead of
    /// starting the proxy empty.
    pub salvage_draft_on_rebind: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gitiles_base: option_env!("REVIEW_CHECKLIST_GITILES_BASE")
                .unwrap_or(DEFAULT_GITILES_BASE)
                .trim_end_matches('/')
                .to_string(),
            branch: option_env!("REVIEW_CHECKLIST_BRANCH")
                .unwrap_or(DEFAULT_BRANCH)
                .to_string(),
            config_file: option_env!("REVIEW_CHECKLIST_FILE")
                .unwrap_or(DEFAULT_CONFIG_FILE)
                .to_string(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
            fallback_items: DEFAULT_CHECKLIST.iter().map(|item| item.to_string()).collect(),
            salvage_draft_on_rebind: false,
        }
    }
}

impl Settings {
    /// Gitiles URL of the repository's checklist file.
    pub fn config_url(&self, repository: &str) -> String {
        format!(
            "{}/{}/+show/{}/{}?format=text",
            self.gitiles_base, repository, self.branch, self.config_file
        )
    }

    pub fn fallback_config(&self) -> Config {
        Config {
            items: self.fallback_items.clone(),
            default_status: TriState::NotApplicable,
        }
    }
}

/// Resolved checklist configuration. Never changes after startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub items: Vec<String>,
    pub default_status: TriState,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryChecklist {
    checklist: Vec<String>,
    #[serde(default)]
    default_status: Option<bool>,
}

#[derive(Debug)]
pub enum FetchError {
    Network(String),
    Status(u16),
    TimedOut { after_ms: u32 },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(message) => write!(f, "network error: {message}"),
            FetchError::Status(status) => write!(f, "unexpected HTTP status {status}"),
            FetchError::TimedOut { after_ms } => write!(f, "timed out after {after_ms}ms"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Why the repository checklist could not be used.
#[derive(Debug)]
pub enum ConfigError {
    NoRepository,
    Fetch(FetchError),
    EmptyBody,
    Base64(base64::DecodeError),
    Utf8(std::string::FromUtf8Error),
    Json(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoRepository => write!(f, "page location names no repository"),
            ConfigError::Fetch(error) => write!(f, "fetch failed: {error}"),
            ConfigError::EmptyBody => write!(f, "empty response body"),
            ConfigError::Base64(error) => write!(f, "body is not base64: {error}"),
            ConfigError::Utf8(error) => write!(f, "body is not UTF-8: {error}"),
            ConfigError::Json(error) => write!(f, "invalid checklist JSON: {error}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Fetch(error) => Some(error),
            ConfigError::Base64(error) => Some(error),
            ConfigError::Utf8(error) => Some(error),
            ConfigError::Json(error) => Some(error),
            ConfigError::NoRepository | ConfigError::EmptyBody => None,
        }
    }
}

impl From<FetchError> for ConfigError {
    fn from(error: FetchError) -> Self {
        ConfigError::Fetch(error)
    }
}

/// Source of the raw checklist file.
#[allow(async_fn_in_trait)]
pub trait ConfigFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Extract the repository name from a change page location.
pub fn repository_from_location(location: &str) -> Option<String> {
    REPOSITORY_PATTERN
        .captures(location)
        .and_then(|captures| captures.get(1))
        .map(|repository| repository.as_str().to_string())
        .filter(|repository| !repository.is_empty())
}

/// Decode a Gitiles `?format=text` body (base64 of the JSON file).
pub fn decode_config(body: &str) -> Result<Config, ConfigError> {
    let encoded: String = body.split_whitespace().collect();
    if encoded.is_empty() {
        return Err(ConfigError::EmptyBody);
    }
    let bytes = BASE64.decode(encoded).map_err(ConfigError::Base64)?;
    let json = String::from_utf8(bytes).map_err(ConfigError::Utf8)?;
    let checklist: RepositoryChecklist = serde_json::from_str(&json).map_err(ConfigError::Json)?;
    Ok(Config {
        items: checklist.checklist,
        default_status: TriState::from_json(checklist.default_status),
    })
}

async fn fetch_config(
    fetcher: &impl ConfigFetcher,
    settings: &Settings,
    location: &str,
) -> Result<Config, ConfigError> {
    let repository = repository_from_location(location).ok_or(ConfigError::NoRepository)?;
    let body = fetcher.fetch_text(&settings.config_url(&repository)).await?;
    decode_config(&body)
}

/// Resolve the checklist for the page at `location`. Never fails.
pub async fn resolve_config(
    fetcher: &impl ConfigFetcher,
    settings: &Settings,
    location: &str,
) -> Config {
    match fetch_config(fetcher, settings, location).await {
        Ok(config) => {
            log_info!("[Checklist Config] Using repository checklist ({} items)", config.items.len());
            config
        }
        Err(error) => {
            log_info!("[Checklist Config] Using default checklist: {error}");
            settings.fallback_config()
        }
    }
}
