//! TMDb-compatible HTTP implementation of [`MediaProvider`].
//!
//! Features:
//! - Token-bucket rate limiting at 4 requests / second via [`governor`].
//! - Automatic retry on HTTP 429 with `Retry-After` header support (max 3
//!   retries).
//! - 30-second request timeout.
//! - Fixed `language` / `region` query parameters on every request; per-call
//!   parameters are merged in without touching the base set.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::provider::{
    CompanyDto, CreditsDto, DiscoverFilter, EpisodeDto, GenreDto, GenreListDto, MediaProvider,
    MovieDetailDto, MovieListItemDto, Page, PersonDetailDto, PersonListItemDto,
    PersonTvCreditsDto, SeasonDetailDto, TvDetailDto, TvListItemDto,
};
use crate::error::{Error, Result};

const BASE_URL: &str = "https://api.themoviedb.org/3";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_RETRIES: u32 = 3;

/// TMDb v3 metadata provider.
///
/// # Examples
///
/// ```no_run
/// use vodforge::metadata::TmdbProvider;
///
/// let provider = TmdbProvider::new("your-api-key".into(), "fr".into(), "fr".into());
/// ```
pub struct TmdbProvider {
    client: reqwest::Client,
    api_key: String,
    language: String,
    region: String,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl TmdbProvider {
    /// Create a new provider with the given API key and locale settings.
    pub fn new(api_key: String, language: String, region: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build reqwest client");

        let quota = Quota::per_second(NonZeroU32::new(4).unwrap());
        let rate_limiter = RateLimiter::direct(quota);

        Self {
            client,
            api_key,
            language,
            region,
            rate_limiter,
        }
    }

    /// Build a full API URL with the base query parameters plus `extra`.
    fn url(&self, path: &str, extra_params: &[(&str, &str)]) -> String {
        let mut url = format!(
            "{BASE_URL}{path}?api_key={}&language={}&region={}",
            self.api_key, self.language, self.region
        );
        for (key, value) in extra_params {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoded(value));
        }
        url
    }

    /// Execute a GET request with rate limiting and 429-retry logic, then
    /// decode the JSON body. A 404 maps to [`Error::NotFound`] carrying the
    /// request path.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, url: &str) -> Result<T> {
        let mut retries = 0u32;
        loop {
            self.rate_limiter.until_ready().await;

            let resp = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| Error::upstream(format!("GET {path}: {e}")))?;

            if resp.status() == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RETRIES {
                retries += 1;
                let wait = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(1);
                warn!(
                    retry = retries,
                    wait_secs = wait,
                    "provider returned 429, backing off"
                );
                tokio::time::sleep(Duration::from_secs(wait)).await;
                continue;
            }

            if resp.status() == StatusCode::NOT_FOUND {
                return Err(Error::not_found("resource", path));
            }

            let resp = resp
                .error_for_status()
                .map_err(|e| Error::upstream(format!("GET {path}: {e}")))?;

            return resp
                .json::<T>()
                .await
                .map_err(|e| Error::upstream(format!("GET {path}: invalid response body: {e}")));
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        extra_params: &[(&str, &str)],
    ) -> Result<T> {
        let url = self.url(path, extra_params);
        debug!(path, "provider request");
        self.get_json(path, &url).await
    }
}

/// Minimal percent-encoding for query parameter values.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

#[async_trait]
impl MediaProvider for TmdbProvider {
    async fn movie_info(&self, id: i32) -> Result<MovieDetailDto> {
        self.fetch(&format!("/movie/{id}"), &[]).await
    }

    async fn movie_credits(&self, id: i32) -> Result<CreditsDto> {
        self.fetch(&format!("/movie/{id}/credits"), &[]).await
    }

    async fn tv_info(&self, id: i32) -> Result<TvDetailDto> {
        self.fetch(&format!("/tv/{id}"), &[]).await
    }

    async fn tv_credits(&self, id: i32) -> Result<CreditsDto> {
        self.fetch(&format!("/tv/{id}/credits"), &[]).await
    }

    async fn tv_episode_info(&self, tv_id: i32, season: i32, episode: i32) -> Result<EpisodeDto> {
        self.fetch(&format!("/tv/{tv_id}/season/{season}/episode/{episode}"), &[])
            .await
    }

    async fn tv_season_info(&self, tv_id: i32, season: i32) -> Result<SeasonDetailDto> {
        self.fetch(&format!("/tv/{tv_id}/season/{season}"), &[])
            .await
    }

    async fn search_movies(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        year: Option<i32>,
    ) -> Result<Page<MovieListItemDto>> {
        let page_str = page.to_string();
        let year_str = year.map(|y| y.to_string());
        let mut params = vec![("query", query), ("page", page_str.as_str())];
        if adult {
            params.push(("include_adult", "true"));
        }
        if let Some(ref y) = year_str {
            params.push(("year", y.as_str()));
        }
        self.fetch("/search/movie", &params).await
    }

    async fn search_tv(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Result<Page<TvListItemDto>> {
        let page_str = page.to_string();
        let mut params = vec![("query", query), ("page", page_str.as_str())];
        if adult {
            params.push(("include_adult", "true"));
        }
        self.fetch("/search/tv", &params).await
    }

    async fn search_people(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Result<Page<PersonListItemDto>> {
        let page_str = page.to_string();
        let mut params = vec![("query", query), ("page", page_str.as_str())];
        if adult {
            params.push(("include_adult", "true"));
        }
        self.fetch("/search/person", &params).await
    }

    async fn discover_movies(
        &self,
        filter: DiscoverFilter,
        page: i32,
    ) -> Result<Page<MovieListItemDto>> {
        let page_str = page.to_string();
        let value = filter.value().to_string();
        self.fetch(
            "/discover/movie",
            &[(filter.param(), value.as_str()), ("page", page_str.as_str())],
        )
        .await
    }

    async fn discover_tv(
        &self,
        filter: DiscoverFilter,
        page: i32,
    ) -> Result<Page<TvListItemDto>> {
        let page_str = page.to_string();
        let value = filter.value().to_string();
        self.fetch(
            "/discover/tv",
            &[(filter.param(), value.as_str()), ("page", page_str.as_str())],
        )
        .await
    }

    async fn movie_recommendations(&self, id: i32) -> Result<Page<MovieListItemDto>> {
        self.fetch(&format!("/movie/{id}/recommendations"), &[])
            .await
    }

    async fn tv_recommendations(&self, id: i32) -> Result<Page<TvListItemDto>> {
        self.fetch(&format!("/tv/{id}/recommendations"), &[]).await
    }

    async fn now_playing_movies(&self, page: i32) -> Result<Page<MovieListItemDto>> {
        let page_str = page.to_string();
        self.fetch("/movie/now_playing", &[("page", page_str.as_str())])
            .await
    }

    async fn airing_today_tv(&self, page: i32) -> Result<Page<TvListItemDto>> {
        let page_str = page.to_string();
        self.fetch("/tv/airing_today", &[("page", page_str.as_str())])
            .await
    }

    async fn popular_movies(&self, page: i32) -> Result<Page<MovieListItemDto>> {
        let page_str = page.to_string();
        self.fetch("/movie/popular", &[("page", page_str.as_str())])
            .await
    }

    async fn popular_tv(&self, page: i32) -> Result<Page<TvListItemDto>> {
        let page_str = page.to_string();
        self.fetch("/tv/popular", &[("page", page_str.as_str())])
            .await
    }

    async fn movie_genres(&self) -> Result<Vec<GenreDto>> {
        let list: GenreListDto = self.fetch("/genre/movie/list", &[]).await?;
        Ok(list.genres)
    }

    async fn tv_genres(&self) -> Result<Vec<GenreDto>> {
        let list: GenreListDto = self.fetch("/genre/tv/list", &[]).await?;
        Ok(list.genres)
    }

    async fn person_info(&self, id: i32) -> Result<PersonDetailDto> {
        self.fetch(&format!("/person/{id}"), &[]).await
    }

    async fn person_tv_credits(&self, id: i32) -> Result<Vec<i32>> {
        let credits: PersonTvCreditsDto = self
            .fetch(&format!("/person/{id}/tv_credits"), &[])
            .await?;
        Ok(credits.cast.into_iter().map(|c| c.id).collect())
    }

    async fn company_info(&self, id: i32) -> Result<CompanyDto> {
        self.fetch(&format!("/company/{id}"), &[]).await
    }

    async fn network_info(&self, id: i32) -> Result<CompanyDto> {
        self.fetch(&format!("/network/{id}"), &[]).await
    }
}
