use reqwest::Url;
use crate::config::env::*;
use crate::config::AdminIds;

const DEFAULT_KINOPOISK_API_URL: &str = "https://kinopoiskapiunofficial.tech/api/v2.1/films/search-by-keyword";

#[derive(Clone)]
pub struct AppConfig {
    pub admins: AdminIds,
    pub web_app_url: Url,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: Url,
    pub max_connections: u32
}

#[derive(Clone)]
pub struct ResolverConfig {
    pub api_url: Url,
    pub api_key: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let admins: AdminIds = get_optional_env_value("ADMIN_IDS");
        if admins.is_empty() {
            log::warn!("ADMIN_IDS is empty, nobody will be able to open the admin panel");
        }
        Ok(Self {
            admins,
            web_app_url: get_env_mandatory_value("WEB_APP_URL")?,
        })
    }
}

impl DatabaseConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            url: get_env_mandatory_value("DATABASE_URL")?,
            max_connections: get_env_value_or_default("DATABASE_MAX_CONNECTIONS", 10)
        })
    }
}

impl ResolverConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let default_url = Url::parse(DEFAULT_KINOPOISK_API_URL)?;
        Ok(Self {
            api_url: get_env_value_or_default("KINOPOISK_API_URL", default_url),
            api_key: get_env_mandatory_value("KINOPOISK_API_KEY")?,
        })
    }
}

