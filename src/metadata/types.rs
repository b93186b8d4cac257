//! Domain entities returned by the metadata client.
//!
//! Image URL fields are never empty: when the upstream provider has no
//! artwork for an item, the field carries one of the placeholder URLs below
//! so consumers can render without special-casing.

use serde::{Deserialize, Serialize};

/// Placeholder shown when a person has no profile picture.
pub const PROFILE_PLACEHOLDER_URL: &str =
    "https://static.vodforge.dev/placeholders/profile.jpg";
/// Placeholder shown when an item has no backdrop.
pub const BACKDROP_PLACEHOLDER_URL: &str =
    "https://static.vodforge.dev/placeholders/backdrop.jpg";
/// Placeholder shown when an item has no poster.
pub const POSTER_PLACEHOLDER_URL: &str =
    "https://static.vodforge.dev/placeholders/poster.jpg";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Studio {
    pub id: i32,
    pub name: String,
    pub logo_url: String,
}

/// A cast or crew member attached to a specific item. For crew entries the
/// `character` field carries the job title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub character: String,
    pub profile_url: String,
}

/// A person looked up on their own, outside the context of a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i32,
    pub name: String,
    pub profile_url: String,
    pub overview: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i32,
    pub title: String,
    pub overview: String,
    /// Release date as a `YYYY-MM-DD` string; may be empty when unknown.
    pub release_date: String,
    pub poster_url: String,
    pub backdrop_url: String,
    pub vote_average: f32,
    pub vote_count: i32,
    pub genres: Vec<Genre>,
    pub studios: Vec<Studio>,
    pub actors: Vec<Person>,
    pub crew: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TVEpisode {
    pub id: i32,
    pub tv_show_id: i32,
    pub season_number: i32,
    pub episode_number: i32,
    pub name: String,
    pub overview: String,
    /// Air date as a `YYYY-MM-DD` string; may be empty when unknown.
    pub air_date: String,
    pub poster_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TVShow {
    pub id: i32,
    pub title: String,
    pub overview: String,
    /// First air date as a `YYYY-MM-DD` string; may be empty when unknown.
    pub release_date: String,
    pub poster_url: String,
    pub backdrop_url: String,
    pub vote_average: f32,
    pub vote_count: i32,
    pub genres: Vec<Genre>,
    pub studios: Vec<Studio>,
    pub networks: Vec<Studio>,
    pub actors: Vec<Person>,
    pub crew: Vec<Person>,
    pub status: String,
    pub next_episode: Option<TVEpisode>,
    pub seasons_count: i32,
    pub episodes_count: i32,
}

/// One page of results from a paginated provider endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResults<T> {
    pub results: Vec<T>,
    pub total_page: i32,
    pub total_result: i32,
}

impl<T> PaginatedResults<T> {
    /// An empty zero-page result set.
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            total_page: 0,
            total_result: 0,
        }
    }
}
