//! Typed cache in front of the metadata provider.
//!
//! The [`MediaCache`] trait exposes one add/get pair per entity kind. A miss
//! is a first-class, normal outcome: implementations must report any internal
//! failure (transport, serialization, type mismatch) as a miss on reads and
//! silently drop the write, logging as appropriate. Callers then simply fall
//! through to the upstream provider.
//!
//! Two variants exist:
//! - [`MemoryCache`] -- in-process map with a uniform TTL, meant for tests
//!   and short-lived processes.
//! - [`RedisCache`] -- remote key/value store with content-aware TTLs, safe
//!   to share between processes.

pub mod keys;
mod memory;
mod redis;

pub use memory::MemoryCache;
pub use redis::RedisCache;

use async_trait::async_trait;

use super::types::{Actor, Genre, Movie, PaginatedResults, TVEpisode, TVShow};

/// Typed store for every cacheable entity kind.
///
/// `get_*` returns `None` on miss; `add_*` never fails from the caller's
/// point of view.
#[async_trait]
pub trait MediaCache: Send + Sync {
    async fn add_movie(&self, movie: &Movie);
    async fn get_movie(&self, id: i32) -> Option<Movie>;

    async fn add_movie_short(&self, movie: &Movie);
    async fn get_movie_short(&self, id: i32) -> Option<Movie>;

    async fn add_tv(&self, tv: &TVShow);
    async fn get_tv(&self, id: i32) -> Option<TVShow>;

    async fn add_tv_short(&self, tv: &TVShow);
    async fn get_tv_short(&self, id: i32) -> Option<TVShow>;

    async fn add_episode(&self, episode: &TVEpisode);
    async fn get_episode(&self, tv_id: i32, season: i32, episode: i32) -> Option<TVEpisode>;

    async fn add_season(&self, tv_id: i32, season: i32, episodes: &[TVEpisode]);
    async fn get_season(&self, tv_id: i32, season: i32) -> Option<Vec<TVEpisode>>;

    async fn add_movie_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        results: &PaginatedResults<Movie>,
    );
    async fn get_movie_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Option<PaginatedResults<Movie>>;

    async fn add_movie_search_year(
        &self,
        query: &str,
        page: i32,
        year: &str,
        results: &PaginatedResults<Movie>,
    );
    async fn get_movie_search_year(
        &self,
        query: &str,
        page: i32,
        year: &str,
    ) -> Option<PaginatedResults<Movie>>;

    async fn add_tv_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        results: &PaginatedResults<TVShow>,
    );
    async fn get_tv_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Option<PaginatedResults<TVShow>>;

    async fn add_actor_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        results: &PaginatedResults<Actor>,
    );
    async fn get_actor_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Option<PaginatedResults<Actor>>;

    async fn add_movies_by_genre(
        &self,
        genre_id: i32,
        page: i32,
        results: &PaginatedResults<Movie>,
    );
    async fn get_movies_by_genre(&self, genre_id: i32, page: i32)
        -> Option<PaginatedResults<Movie>>;

    async fn add_tvs_by_genre(&self, genre_id: i32, page: i32, results: &PaginatedResults<TVShow>);
    async fn get_tvs_by_genre(&self, genre_id: i32, page: i32)
        -> Option<PaginatedResults<TVShow>>;

    async fn add_movies_by_actor(
        &self,
        actor_id: i32,
        page: i32,
        results: &PaginatedResults<Movie>,
    );
    async fn get_movies_by_actor(&self, actor_id: i32, page: i32)
        -> Option<PaginatedResults<Movie>>;

    async fn add_tvs_by_actor(&self, actor_id: i32, page: i32, results: &PaginatedResults<TVShow>);
    async fn get_tvs_by_actor(&self, actor_id: i32, page: i32)
        -> Option<PaginatedResults<TVShow>>;

    async fn add_movies_by_studio(
        &self,
        studio_id: i32,
        page: i32,
        results: &PaginatedResults<Movie>,
    );
    async fn get_movies_by_studio(
        &self,
        studio_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<Movie>>;

    async fn add_tvs_by_network(
        &self,
        network_id: i32,
        page: i32,
        results: &PaginatedResults<TVShow>,
    );
    async fn get_tvs_by_network(
        &self,
        network_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<TVShow>>;

    async fn add_movie_recommendations(&self, movie_id: i32, results: &[Movie]);
    async fn get_movie_recommendations(&self, movie_id: i32) -> Option<Vec<Movie>>;

    async fn add_tv_recommendations(&self, tv_id: i32, results: &[TVShow]);
    async fn get_tv_recommendations(&self, tv_id: i32) -> Option<Vec<TVShow>>;

    async fn add_movie_genre(&self, genre: &Genre);
    async fn get_movie_genre(&self, id: i32) -> Option<Genre>;

    async fn add_tv_genre(&self, genre: &Genre);
    async fn get_tv_genre(&self, id: i32) -> Option<Genre>;

    async fn add_actor(&self, actor: &Actor);
    async fn get_actor(&self, id: i32) -> Option<Actor>;
}
