use anyhow::{Context, Result as AnyResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{CatalogError, Result};
use crate::models::{MovieDetails, MovieSummary};

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";

#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>>;
    async fn get_movie(&self, id: &str) -> Result<MovieDetails>;
    async fn get_trending(
        &self,
        media_type: MediaType,
        time_window: TimeWindow,
    ) -> Result<Vec<MovieSummary>>;
    async fn get_top_rated(&self, page: u32) -> Result<Vec<MovieSummary>>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    All,
    Movie,
    Tv,
    Person,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::All => "all",
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
            MediaType::Person => "person",
        }
    }
}

impl FromStr for MediaType {
    type Err = CatalogError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "all" => Ok(MediaType::All),
            "movie" => Ok(MediaType::Movie),
            "tv" => Ok(MediaType::Tv),
            "person" => Ok(MediaType::Person),
            _ => Err(CatalogError::InvalidArgument {
                name: "media_type",
                value: s.to_string(),
                expected: "all, movie, tv, person",
            }),
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

impl FromStr for TimeWindow {
    type Err = CatalogError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            _ => Err(CatalogError::InvalidArgument {
                name: "time_window",
                value: s.to_string(),
                expected: "day, week",
            }),
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TmdbClient {
    pub fn new(access_token: impl Into<String>, base_url: &str) -> AnyResult<Self> {
        let user_agent = format!("moviegraph/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .user_agent(user_agent)
            .build()
            .context("Failed to build TMDB HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }

    pub fn from_env() -> AnyResult<Self> {
        let access_token = env::var("TMDB_ACCESS_TOKEN")
            .ok()
            .filter(|s| !s.is_empty())
            .context("TMDB_ACCESS_TOKEN not set")?;
        let base_url = env::var("TMDB_BASE_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| TMDB_BASE.to_string());
        Self::new(access_token, &base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {}", url);
        let res = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await?;
        if !status.is_success() {
            warn!("TMDB answered {} for {}", status, path);
            return Err(CatalogError::UpstreamStatus {
                status: status.as_u16(),
                path: path.to_string(),
                message: upstream_message(&text),
            });
        }
        serde_json::from_str(&text).map_err(|source| CatalogError::Decode {
            path: path.to_string(),
            source,
        })
    }

    async fn get_results(&self, path: &str) -> Result<Vec<MovieSummary>> {
        let page: Paged<MovieSummary> = self.get_json(path).await?;
        page.into_results(path)
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn search_movies(&self, query: &str) -> Result<Vec<MovieSummary>> {
        self.get_results(&search_path(query)).await
    }

    async fn get_movie(&self, id: &str) -> Result<MovieDetails> {
        self.get_json(&movie_path(id)).await
    }

    async fn get_trending(
        &self,
        media_type: MediaType,
        time_window: TimeWindow,
    ) -> Result<Vec<MovieSummary>> {
        self.get_results(&trending_path(media_type, time_window))
            .await
    }

    async fn get_top_rated(&self, page: u32) -> Result<Vec<MovieSummary>> {
        self.get_results(&top_rated_path(page)).await
    }
}

#[derive(Debug, Deserialize)]
struct Paged<T> {
    results: Option<Vec<T>>,
}

impl<T> Paged<T> {
    fn into_results(self, path: &str) -> Result<Vec<T>> {
        self.results.ok_or_else(|| CatalogError::MissingResults {
            path: path.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status_message: String,
}

fn upstream_message(body: &str) -> String {
    match serde_json::from_str::<StatusBody>(body) {
        Ok(b) => b.status_message,
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

pub fn search_path(query: &str) -> String {
    format!("search/movie?query={}&page=1", urlencoding::encode(query))
}

pub fn movie_path(id: &str) -> String {
    format!("movie/{}", urlencoding::encode(id))
}

pub fn trending_path(media_type: MediaType, time_window: TimeWindow) -> String {
    format!("trending/{media_type}/{time_window}")
}

pub fn top_rated_path(page: u32) -> String {
    format!("movie/top_rated?page={page}")
}
