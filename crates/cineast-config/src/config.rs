use cineast_models::ToplistQuery;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CMDB_URL: &str = "https://grupp6.dsvkurs.miun.se/api/";
pub const DEFAULT_OMDB_URL: &str = "https://www.omdbapi.com/";

const PLACEHOLDER_APP: &str = "YOUR_APP_NAME";

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub flags: FlagConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    /// Ratings backend base URL
    #[serde(default = "default_cmdb_url")]
    pub cmdb_url: String,
    /// Metadata backend base URL
    #[serde(default = "default_omdb_url")]
    pub omdb_url: String,
    /// Application name registered with the key service (`GET /keys/{app}/{secret}`)
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_toplist_limit")]
    pub toplist_limit: u32,
    /// Minimum number of ratings for a movie to appear on a top list
    #[serde(default = "default_count_limit")]
    pub count_limit: u32,
    /// How many remote top list pages "show more" may load
    #[serde(default = "default_toplist_max_pages")]
    pub toplist_max_pages: u32,
    #[serde(default = "default_review_page_size")]
    pub review_page_size: usize,
    #[serde(default = "default_search_page_size")]
    pub search_page_size: usize,
    /// Suggestions under the global search bar
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
    /// Suggestions on the search page
    #[serde(default = "default_search_suggestion_limit")]
    pub search_suggestion_limit: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FlagConfig {
    #[serde(default = "default_reviewed_ttl_hours")]
    pub reviewed_ttl_hours: i64,
}

fn default_cmdb_url() -> String {
    DEFAULT_CMDB_URL.to_string()
}

fn default_omdb_url() -> String {
    DEFAULT_OMDB_URL.to_string()
}

fn default_app_name() -> String {
    PLACEHOLDER_APP.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_toplist_limit() -> u32 {
    11
}

fn default_count_limit() -> u32 {
    2
}

fn default_toplist_max_pages() -> u32 {
    4
}

fn default_review_page_size() -> usize {
    3
}

fn default_search_page_size() -> usize {
    10
}

fn default_suggestion_limit() -> usize {
    4
}

fn default_search_suggestion_limit() -> usize {
    3
}

fn default_reviewed_ttl_hours() -> i64 {
    24
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cmdb_url: default_cmdb_url(),
            omdb_url: default_omdb_url(),
            app_name: default_app_name(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            toplist_limit: default_toplist_limit(),
            count_limit: default_count_limit(),
            toplist_max_pages: default_toplist_max_pages(),
            review_page_size: default_review_page_size(),
            search_page_size: default_search_page_size(),
            suggestion_limit: default_suggestion_limit(),
            search_suggestion_limit: default_search_suggestion_limit(),
        }
    }
}

impl Default for FlagConfig {
    fn default() -> Self {
        Self {
            reviewed_ttl_hours: default_reviewed_ttl_hours(),
        }
    }
}

impl DisplayConfig {
    /// Top list query for the given remote page
    pub fn toplist_query(&self, worst: bool, page: u32) -> ToplistQuery {
        let query = if worst {
            ToplistQuery::worst(self.toplist_limit)
        } else {
            ToplistQuery::top(self.toplist_limit)
        };
        query.with_page(page).with_count_limit(self.count_limit)
    }
}

impl FlagConfig {
    pub fn reviewed_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.reviewed_ttl_hours)
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file when it exists, defaults otherwise
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [("cmdb_url", &self.api.cmdb_url), ("omdb_url", &self.api.omdb_url)] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow::anyhow!("{} must be an http(s) URL, got '{}'", name, url));
            }
        }

        if !self.is_key_service_configured() {
            return Err(anyhow::anyhow!(
                "app_name is not configured; run `cineast config init --app-name <name>`"
            ));
        }

        if self.api.timeout_secs == 0 {
            return Err(anyhow::anyhow!("timeout_secs must be greater than zero"));
        }

        let sizes = [
            ("toplist_limit", self.display.toplist_limit as usize),
            ("review_page_size", self.display.review_page_size),
            ("search_page_size", self.display.search_page_size),
            ("suggestion_limit", self.display.suggestion_limit),
            ("search_suggestion_limit", self.display.search_suggestion_limit),
        ];
        for (name, value) in sizes {
            if value == 0 {
                return Err(anyhow::anyhow!("{} must be greater than zero", name));
            }
        }

        if self.flags.reviewed_ttl_hours <= 0 {
            return Err(anyhow::anyhow!("reviewed_ttl_hours must be positive"));
        }

        Ok(())
    }

    pub fn is_key_service_configured(&self) -> bool {
        !self.api.app_name.trim().is_empty() && self.api.app_name != PLACEHOLDER_APP
    }
}
