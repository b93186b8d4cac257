//! Remote key/value cache variant.
//!
//! Values are stored as JSON with a per-write TTL derived from the release
//! date of the cached item (recent items expire sooner, see
//! [`crate::metadata::expiration`]). Any failure -- connection, transport,
//! decode -- is logged and degraded: reads report a miss, writes are
//! dropped. The store being down must never fail a metadata call.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::keys;
use super::MediaCache;
use crate::error::{Error, Result};
use crate::metadata::expiration::{release_ttl, DEFAULT_TTL, ONE_WEEK_TTL};
use crate::metadata::types::{Actor, Genre, Movie, PaginatedResults, TVEpisode, TVShow};

/// Redis-backed [`MediaCache`].
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    /// Connect to a Redis server. `password` may be empty.
    pub async fn connect(addr: &str, password: &str) -> Result<Self> {
        let url = if password.is_empty() {
            format!("redis://{addr}")
        } else {
            format!("redis://:{password}@{addr}")
        };

        let client = redis::Client::open(url)
            .map_err(|e| Error::Internal(format!("invalid redis address {addr}: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| Error::Internal(format!("failed to connect to redis at {addr}: {e}")))?;

        Ok(Self { conn })
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.conn.clone();
        let data: Option<String> = match conn.get(key).await {
            Ok(data) => data,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };
        let json = data?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "cache entry failed to decode, treating as miss");
                None
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "cache entry failed to encode, dropping write");
                return;
            }
        };
        let mut conn = self.conn.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, json, ttl.as_secs()).await {
            warn!(key, error = %e, "cache write failed, dropping");
        } else {
            debug!(key, ttl_secs = ttl.as_secs(), "cache write");
        }
    }
}

#[async_trait]
impl MediaCache for RedisCache {
    async fn add_movie(&self, movie: &Movie) {
        self.write(
            &keys::movie(movie.id),
            movie,
            release_ttl(&movie.release_date),
        )
        .await;
    }

    async fn get_movie(&self, id: i32) -> Option<Movie> {
        self.read(&keys::movie(id)).await
    }

    async fn add_movie_short(&self, movie: &Movie) {
        self.write(
            &keys::movie_short(movie.id),
            movie,
            release_ttl(&movie.release_date),
        )
        .await;
    }

    async fn get_movie_short(&self, id: i32) -> Option<Movie> {
        self.read(&keys::movie_short(id)).await
    }

    async fn add_tv(&self, tv: &TVShow) {
        self.write(&keys::tv(tv.id), tv, release_ttl(&tv.release_date))
            .await;
    }

    async fn get_tv(&self, id: i32) -> Option<TVShow> {
        self.read(&keys::tv(id)).await
    }

    async fn add_tv_short(&self, tv: &TVShow) {
        self.write(&keys::tv_short(tv.id), tv, release_ttl(&tv.release_date))
            .await;
    }

    async fn get_tv_short(&self, id: i32) -> Option<TVShow> {
        self.read(&keys::tv_short(id)).await
    }

    async fn add_episode(&self, episode: &TVEpisode) {
        self.write(
            &keys::episode(
                episode.tv_show_id,
                episode.season_number,
                episode.episode_number,
            ),
            episode,
            release_ttl(&episode.air_date),
        )
        .await;
    }

    async fn get_episode(&self, tv_id: i32, season: i32, episode: i32) -> Option<TVEpisode> {
        self.read(&keys::episode(tv_id, season, episode)).await
    }

    async fn add_season(&self, tv_id: i32, season: i32, episodes: &[TVEpisode]) {
        self.write(&keys::season(tv_id, season), &episodes, DEFAULT_TTL)
            .await;
        // A season fetch has every episode in hand; fill the per-episode
        // entries while we are at it.
        for episode in episodes {
            self.add_episode(episode).await;
        }
    }

    async fn get_season(&self, tv_id: i32, season: i32) -> Option<Vec<TVEpisode>> {
        self.read(&keys::season(tv_id, season)).await
    }

    async fn add_movie_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        results: &PaginatedResults<Movie>,
    ) {
        self.write(
            &keys::movie_search(query, page, adult),
            results,
            ONE_WEEK_TTL,
        )
        .await;
    }

    async fn get_movie_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Option<PaginatedResults<Movie>> {
        self.read(&keys::movie_search(query, page, adult)).await
    }

    async fn add_movie_search_year(
        &self,
        query: &str,
        page: i32,
        year: &str,
        results: &PaginatedResults<Movie>,
    ) {
        self.write(
            &keys::movie_search_year(query, page, year),
            results,
            ONE_WEEK_TTL,
        )
        .await;
    }

    async fn get_movie_search_year(
        &self,
        query: &str,
        page: i32,
        year: &str,
    ) -> Option<PaginatedResults<Movie>> {
        self.read(&keys::movie_search_year(query, page, year)).await
    }

    async fn add_tv_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        results: &PaginatedResults<TVShow>,
    ) {
        self.write(&keys::tv_search(query, page, adult), results, ONE_WEEK_TTL)
            .await;
    }

    async fn get_tv_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Option<PaginatedResults<TVShow>> {
        self.read(&keys::tv_search(query, page, adult)).await
    }

    async fn add_actor_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        results: &PaginatedResults<Actor>,
    ) {
        self.write(
            &keys::actor_search(query, page, adult),
            results,
            ONE_WEEK_TTL,
        )
        .await;
    }

    async fn get_actor_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Option<PaginatedResults<Actor>> {
        self.read(&keys::actor_search(query, page, adult)).await
    }

    async fn add_movies_by_genre(
        &self,
        genre_id: i32,
        page: i32,
        results: &PaginatedResults<Movie>,
    ) {
        self.write(&keys::movies_by_genre(genre_id, page), results, ONE_WEEK_TTL)
            .await;
    }

    async fn get_movies_by_genre(
        &self,
        genre_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<Movie>> {
        self.read(&keys::movies_by_genre(genre_id, page)).await
    }

    async fn add_tvs_by_genre(
        &self,
        genre_id: i32,
        page: i32,
        results: &PaginatedResults<TVShow>,
    ) {
        self.write(&keys::tvs_by_genre(genre_id, page), results, ONE_WEEK_TTL)
            .await;
    }

    async fn get_tvs_by_genre(
        &self,
        genre_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<TVShow>> {
        self.read(&keys::tvs_by_genre(genre_id, page)).await
    }

    async fn add_movies_by_actor(
        &self,
        actor_id: i32,
        page: i32,
        results: &PaginatedResults<Movie>,
    ) {
        self.write(&keys::movies_by_actor(actor_id, page), results, ONE_WEEK_TTL)
            .await;
    }

    async fn get_movies_by_actor(
        &self,
        actor_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<Movie>> {
        self.read(&keys::movies_by_actor(actor_id, page)).await
    }

    async fn add_tvs_by_actor(
        &self,
        actor_id: i32,
        page: i32,
        results: &PaginatedResults<TVShow>,
    ) {
        self.write(&keys::tvs_by_actor(actor_id, page), results, ONE_WEEK_TTL)
            .await;
    }

    async fn get_tvs_by_actor(
        &self,
        actor_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<TVShow>> {
        self.read(&keys::tvs_by_actor(actor_id, page)).await
    }

    async fn add_movies_by_studio(
        &self,
        studio_id: i32,
        page: i32,
        results: &PaginatedResults<Movie>,
    ) {
        self.write(
            &keys::movies_by_studio(studio_id, page),
            results,
            ONE_WEEK_TTL,
        )
        .await;
    }

    async fn get_movies_by_studio(
        &self,
        studio_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<Movie>> {
        self.read(&keys::movies_by_studio(studio_id, page)).await
    }

    async fn add_tvs_by_network(
        &self,
        network_id: i32,
        page: i32,
        results: &PaginatedResults<TVShow>,
    ) {
        self.write(
            &keys::tvs_by_network(network_id, page),
            results,
            ONE_WEEK_TTL,
        )
        .await;
    }

    async fn get_tvs_by_network(
        &self,
        network_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<TVShow>> {
        self.read(&keys::tvs_by_network(network_id, page)).await
    }

    async fn add_movie_recommendations(&self, movie_id: i32, results: &[Movie]) {
        self.write(
            &keys::movie_recommendations(movie_id),
            &results,
            ONE_WEEK_TTL,
        )
        .await;
    }

    async fn get_movie_recommendations(&self, movie_id: i32) -> Option<Vec<Movie>> {
        self.read(&keys::movie_recommendations(movie_id)).await
    }

    async fn add_tv_recommendations(&self, tv_id: i32, results: &[TVShow]) {
        self.write(&keys::tv_recommendations(tv_id), &results, ONE_WEEK_TTL)
            .await;
    }

    async fn get_tv_recommendations(&self, tv_id: i32) -> Option<Vec<TVShow>> {
        self.read(&keys::tv_recommendations(tv_id)).await
    }

    async fn add_movie_genre(&self, genre: &Genre) {
        self.write(&keys::movie_genre(genre.id), genre, DEFAULT_TTL)
            .await;
    }

    async fn get_movie_genre(&self, id: i32) -> Option<Genre> {
        self.read(&keys::movie_genre(id)).await
    }

    async fn add_tv_genre(&self, genre: &Genre) {
        self.write(&keys::tv_genre(genre.id), genre, DEFAULT_TTL)
            .await;
    }

    async fn get_tv_genre(&self, id: i32) -> Option<Genre> {
        self.read(&keys::tv_genre(id)).await
    }

    async fn add_actor(&self, actor: &Actor) {
        self.write(&keys::actor(actor.id), actor, DEFAULT_TTL).await;
    }

    async fn get_actor(&self, id: i32) -> Option<Actor> {
        self.read(&keys::actor(id)).await
    }
}
