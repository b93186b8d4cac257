//! Provider trait and wire types for the upstream metadata API.
//!
//! The wire shapes follow the TMDb v3 contract; any compatible provider can
//! be used. The [`MediaProvider`] trait exposes one method per upstream
//! endpoint consumed by the metadata client so tests can substitute a stub
//! at the seam.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::Result;

/// Base URL for provider-hosted artwork, original resolution.
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/original";

/// Convert a provider image path fragment to a full URL, falling back to the
/// given placeholder when the fragment is absent or empty.
pub fn image_url(path: Option<&str>, placeholder: &str) -> String {
    match path {
        Some(p) if !p.is_empty() => format!("{IMAGE_BASE_URL}{p}"),
        _ => placeholder.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One page of a paginated provider response.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    #[serde(default)]
    pub page: i32,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: i32,
    #[serde(default)]
    pub total_results: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreDto {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreListDto {
    #[serde(default)]
    pub genres: Vec<GenreDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompanyDto {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    pub logo_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CastDto {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub character: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CrewDto {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreditsDto {
    #[serde(default)]
    pub cast: Vec<CastDto>,
    #[serde(default)]
    pub crew: Vec<CrewDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetailDto {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: i32,
    #[serde(default)]
    pub genres: Vec<GenreDto>,
    #[serde(default)]
    pub production_companies: Vec<CompanyDto>,
}

/// A movie as it appears inside list endpoints (search, discover,
/// recommendations, now-playing, popular).
#[derive(Debug, Clone, Deserialize)]
pub struct MovieListItemDto {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: i32,
    #[serde(default)]
    pub popularity: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvDetailDto {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub first_air_date: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: i32,
    #[serde(default)]
    pub genres: Vec<GenreDto>,
    #[serde(default)]
    pub production_companies: Vec<CompanyDto>,
    #[serde(default)]
    pub networks: Vec<CompanyDto>,
    #[serde(default)]
    pub status: String,
    pub next_episode_to_air: Option<EpisodeDto>,
    #[serde(default)]
    pub number_of_seasons: i32,
    #[serde(default)]
    pub number_of_episodes: i32,
}

/// A TV show as it appears inside list endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TvListItemDto {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub first_air_date: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: i32,
    #[serde(default)]
    pub popularity: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeDto {
    pub id: i32,
    #[serde(default)]
    pub season_number: i32,
    #[serde(default)]
    pub episode_number: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub air_date: String,
    pub still_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonDetailDto {
    #[serde(default)]
    pub episodes: Vec<EpisodeDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonDetailDto {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub biography: String,
    pub profile_path: Option<String>,
}

/// A person as it appears inside search results.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonListItemDto {
    pub id: i32,
    #[serde(default)]
    pub name: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvCreditDto {
    pub id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonTvCreditsDto {
    #[serde(default)]
    pub cast: Vec<TvCreditDto>,
}

// ---------------------------------------------------------------------------
// Discover filters
// ---------------------------------------------------------------------------

/// Attribute filter for the discover endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoverFilter {
    /// `with_genres`
    Genre(i32),
    /// `with_cast`
    Cast(i32),
    /// `with_crew`
    Crew(i32),
    /// `with_companies`
    Company(i32),
    /// `with_networks`
    Network(i32),
}

impl DiscoverFilter {
    /// The query parameter name this filter maps to.
    pub fn param(&self) -> &'static str {
        match self {
            DiscoverFilter::Genre(_) => "with_genres",
            DiscoverFilter::Cast(_) => "with_cast",
            DiscoverFilter::Crew(_) => "with_crew",
            DiscoverFilter::Company(_) => "with_companies",
            DiscoverFilter::Network(_) => "with_networks",
        }
    }

    /// The filter value.
    pub fn value(&self) -> i32 {
        match *self {
            DiscoverFilter::Genre(id)
            | DiscoverFilter::Cast(id)
            | DiscoverFilter::Crew(id)
            | DiscoverFilter::Company(id)
            | DiscoverFilter::Network(id) => id,
        }
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// Async trait over the upstream metadata API.
///
/// Implementations are expected to be wrapped in an `Arc` and shared across
/// tasks.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    async fn movie_info(&self, id: i32) -> Result<MovieDetailDto>;
    async fn movie_credits(&self, id: i32) -> Result<CreditsDto>;
    async fn tv_info(&self, id: i32) -> Result<TvDetailDto>;
    async fn tv_credits(&self, id: i32) -> Result<CreditsDto>;
    async fn tv_episode_info(&self, tv_id: i32, season: i32, episode: i32) -> Result<EpisodeDto>;
    async fn tv_season_info(&self, tv_id: i32, season: i32) -> Result<SeasonDetailDto>;

    async fn search_movies(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        year: Option<i32>,
    ) -> Result<Page<MovieListItemDto>>;
    async fn search_tv(&self, query: &str, page: i32, adult: bool)
        -> Result<Page<TvListItemDto>>;
    async fn search_people(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Result<Page<PersonListItemDto>>;

    async fn discover_movies(
        &self,
        filter: DiscoverFilter,
        page: i32,
    ) -> Result<Page<MovieListItemDto>>;
    async fn discover_tv(&self, filter: DiscoverFilter, page: i32)
        -> Result<Page<TvListItemDto>>;

    async fn movie_recommendations(&self, id: i32) -> Result<Page<MovieListItemDto>>;
    async fn tv_recommendations(&self, id: i32) -> Result<Page<TvListItemDto>>;

    async fn now_playing_movies(&self, page: i32) -> Result<Page<MovieListItemDto>>;
    async fn airing_today_tv(&self, page: i32) -> Result<Page<TvListItemDto>>;
    async fn popular_movies(&self, page: i32) -> Result<Page<MovieListItemDto>>;
    async fn popular_tv(&self, page: i32) -> Result<Page<TvListItemDto>>;

    async fn movie_genres(&self) -> Result<Vec<GenreDto>>;
    async fn tv_genres(&self) -> Result<Vec<GenreDto>>;

    async fn person_info(&self, id: i32) -> Result<PersonDetailDto>;
    /// TV show ids the person is credited in, upstream order.
    async fn person_tv_credits(&self, id: i32) -> Result<Vec<i32>>;

    async fn company_info(&self, id: i32) -> Result<CompanyDto>;
    async fn network_info(&self, id: i32) -> Result<CompanyDto>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_url_joins_fragment() {
        assert_eq!(
            image_url(Some("/abc.jpg"), "fallback"),
            "https://image.tmdb.org/t/p/original/abc.jpg"
        );
    }

    #[test]
    fn image_url_falls_back_when_missing() {
        assert_eq!(image_url(None, "fallback"), "fallback");
        assert_eq!(image_url(Some(""), "fallback"), "fallback");
    }

    #[test]
    fn discover_filter_params() {
        assert_eq!(DiscoverFilter::Genre(28).param(), "with_genres");
        assert_eq!(DiscoverFilter::Cast(1).param(), "with_cast");
        assert_eq!(DiscoverFilter::Crew(1).param(), "with_crew");
        assert_eq!(DiscoverFilter::Company(33).param(), "with_companies");
        assert_eq!(DiscoverFilter::Network(49).param(), "with_networks");
        assert_eq!(DiscoverFilter::Genre(28).value(), 28);
    }

    #[test]
    fn page_deserializes_with_missing_fields() {
        let page: Page<GenreDto> = serde_json::from_str("{}").unwrap();
        assert_eq!(page.page, 0);
        assert!(page.results.is_empty());
        assert_eq!(page.total_pages, 0);
    }
}
