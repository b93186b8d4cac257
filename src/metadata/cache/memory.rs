//! In-process cache variant.
//!
//! Entries are stored type-erased and verified on read: a type mismatch is
//! reported as a miss, never a panic. Expired entries are skipped lazily on
//! read and collected by a background sweep task when a tokio runtime is
//! available at construction time.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::keys;
use super::MediaCache;
use crate::metadata::types::{Actor, Genre, Movie, PaginatedResults, TVEpisode, TVShow};

/// Default entry lifetime.
const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
/// Default interval between expiration sweeps.
const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10 * 60);

struct Entry {
    value: Arc<dyn Any + Send + Sync>,
    expires_at: Instant,
}

type Store = Arc<RwLock<HashMap<String, Entry>>>;

/// In-memory [`MediaCache`] with a single uniform TTL.
pub struct MemoryCache {
    store: Store,
    ttl: Duration,
}

impl MemoryCache {
    /// Create a cache with explicit TTL and sweep interval.
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        let store: Store = Arc::new(RwLock::new(HashMap::new()));
        spawn_sweeper(&store, sweep_interval);
        Self { store, ttl }
    }

    fn put<T: Send + Sync + 'static>(&self, key: String, value: T) {
        let entry = Entry {
            value: Arc::new(value),
            expires_at: Instant::now() + self.ttl,
        };
        self.store.write().insert(key, entry);
    }

    fn fetch<T: Clone + 'static>(&self, key: &str) -> Option<T> {
        let guard = self.store.read();
        let entry = guard.get(key)?;
        if entry.expires_at <= Instant::now() {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_SWEEP_INTERVAL)
    }
}

/// Start the background sweep task. Outside of a tokio runtime the sweeper
/// is skipped; reads still expire entries lazily.
fn spawn_sweeper(store: &Store, interval: Duration) {
    let Ok(handle) = tokio::runtime::Handle::try_current() else {
        return;
    };
    let weak = Arc::downgrade(store);
    handle.spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(store) = weak.upgrade() else {
                break;
            };
            let now = Instant::now();
            store.write().retain(|_, entry| entry.expires_at > now);
        }
    });
}

#[async_trait]
impl MediaCache for MemoryCache {
    async fn add_movie(&self, movie: &Movie) {
        self.put(keys::movie(movie.id), movie.clone());
    }

    async fn get_movie(&self, id: i32) -> Option<Movie> {
        self.fetch(&keys::movie(id))
    }

    async fn add_movie_short(&self, movie: &Movie) {
        self.put(keys::movie_short(movie.id), movie.clone());
    }

    async fn get_movie_short(&self, id: i32) -> Option<Movie> {
        self.fetch(&keys::movie_short(id))
    }

    async fn add_tv(&self, tv: &TVShow) {
        self.put(keys::tv(tv.id), tv.clone());
    }

    async fn get_tv(&self, id: i32) -> Option<TVShow> {
        self.fetch(&keys::tv(id))
    }

    async fn add_tv_short(&self, tv: &TVShow) {
        self.put(keys::tv_short(tv.id), tv.clone());
    }

    async fn get_tv_short(&self, id: i32) -> Option<TVShow> {
        self.fetch(&keys::tv_short(id))
    }

    async fn add_episode(&self, episode: &TVEpisode) {
        self.put(
            keys::episode(
                episode.tv_show_id,
                episode.season_number,
                episode.episode_number,
            ),
            episode.clone(),
        );
    }

    async fn get_episode(&self, tv_id: i32, season: i32, episode: i32) -> Option<TVEpisode> {
        self.fetch(&keys::episode(tv_id, season, episode))
    }

    async fn add_season(&self, tv_id: i32, season: i32, episodes: &[TVEpisode]) {
        self.put(keys::season(tv_id, season), episodes.to_vec());
    }

    async fn get_season(&self, tv_id: i32, season: i32) -> Option<Vec<TVEpisode>> {
        self.fetch(&keys::season(tv_id, season))
    }

    async fn add_movie_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        results: &PaginatedResults<Movie>,
    ) {
        self.put(keys::movie_search(query, page, adult), results.clone());
    }

    async fn get_movie_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Option<PaginatedResults<Movie>> {
        self.fetch(&keys::movie_search(query, page, adult))
    }

    async fn add_movie_search_year(
        &self,
        query: &str,
        page: i32,
        year: &str,
        results: &PaginatedResults<Movie>,
    ) {
        self.put(keys::movie_search_year(query, page, year), results.clone());
    }

    async fn get_movie_search_year(
        &self,
        query: &str,
        page: i32,
        year: &str,
    ) -> Option<PaginatedResults<Movie>> {
        self.fetch(&keys::movie_search_year(query, page, year))
    }

    async fn add_tv_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        results: &PaginatedResults<TVShow>,
    ) {
        self.put(keys::tv_search(query, page, adult), results.clone());
    }

    async fn get_tv_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Option<PaginatedResults<TVShow>> {
        self.fetch(&keys::tv_search(query, page, adult))
    }

    async fn add_actor_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        results: &PaginatedResults<Actor>,
    ) {
        self.put(keys::actor_search(query, page, adult), results.clone());
    }

    async fn get_actor_search(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Option<PaginatedResults<Actor>> {
        self.fetch(&keys::actor_search(query, page, adult))
    }

    async fn add_movies_by_genre(
        &self,
        genre_id: i32,
        page: i32,
        results: &PaginatedResults<Movie>,
    ) {
        self.put(keys::movies_by_genre(genre_id, page), results.clone());
    }

    async fn get_movies_by_genre(
        &self,
        genre_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<Movie>> {
        self.fetch(&keys::movies_by_genre(genre_id, page))
    }

    async fn add_tvs_by_genre(
        &self,
        genre_id: i32,
        page: i32,
        results: &PaginatedResults<TVShow>,
    ) {
        self.put(keys::tvs_by_genre(genre_id, page), results.clone());
    }

    async fn get_tvs_by_genre(
        &self,
        genre_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<TVShow>> {
        self.fetch(&keys::tvs_by_genre(genre_id, page))
    }

    async fn add_movies_by_actor(
        &self,
        actor_id: i32,
        page: i32,
        results: &PaginatedResults<Movie>,
    ) {
        self.put(keys::movies_by_actor(actor_id, page), results.clone());
    }

    async fn get_movies_by_actor(
        &self,
        actor_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<Movie>> {
        self.fetch(&keys::movies_by_actor(actor_id, page))
    }

    async fn add_tvs_by_actor(
        &self,
        actor_id: i32,
        page: i32,
        results: &PaginatedResults<TVShow>,
    ) {
        self.put(keys::tvs_by_actor(actor_id, page), results.clone());
    }

    async fn get_tvs_by_actor(
        &self,
        actor_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<TVShow>> {
        self.fetch(&keys::tvs_by_actor(actor_id, page))
    }

    async fn add_movies_by_studio(
        &self,
        studio_id: i32,
        page: i32,
        results: &PaginatedResults<Movie>,
    ) {
        self.put(keys::movies_by_studio(studio_id, page), results.clone());
    }

    async fn get_movies_by_studio(
        &self,
        studio_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<Movie>> {
        self.fetch(&keys::movies_by_studio(studio_id, page))
    }

    async fn add_tvs_by_network(
        &self,
        network_id: i32,
        page: i32,
        results: &PaginatedResults<TVShow>,
    ) {
        self.put(keys::tvs_by_network(network_id, page), results.clone());
    }

    async fn get_tvs_by_network(
        &self,
        network_id: i32,
        page: i32,
    ) -> Option<PaginatedResults<TVShow>> {
        self.fetch(&keys::tvs_by_network(network_id, page))
    }

    async fn add_movie_recommendations(&self, movie_id: i32, results: &[Movie]) {
        self.put(keys::movie_recommendations(movie_id), results.to_vec());
    }

    async fn get_movie_recommendations(&self, movie_id: i32) -> Option<Vec<Movie>> {
        self.fetch(&keys::movie_recommendations(movie_id))
    }

    async fn add_tv_recommendations(&self, tv_id: i32, results: &[TVShow]) {
        self.put(keys::tv_recommendations(tv_id), results.to_vec());
    }

    async fn get_tv_recommendations(&self, tv_id: i32) -> Option<Vec<TVShow>> {
        self.fetch(&keys::tv_recommendations(tv_id))
    }

    async fn add_movie_genre(&self, genre: &Genre) {
        self.put(keys::movie_genre(genre.id), genre.clone());
    }

    async fn get_movie_genre(&self, id: i32) -> Option<Genre> {
        self.fetch(&keys::movie_genre(id))
    }

    async fn add_tv_genre(&self, genre: &Genre) {
        self.put(keys::tv_genre(genre.id), genre.clone());
    }

    async fn get_tv_genre(&self, id: i32) -> Option<Genre> {
        self.fetch(&keys::tv_genre(id))
    }

    async fn add_actor(&self, actor: &Actor) {
        self.put(keys::actor(actor.id), actor.clone());
    }

    async fn get_actor(&self, id: i32) -> Option<Actor> {
        self.fetch(&keys::actor(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_genre() -> Genre {
        Genre {
            id: 28,
            name: "Action".into(),
        }
    }

    fn sample_movie(id: i32) -> Movie {
        Movie {
            id,
            title: format!("Movie {id}"),
            overview: String::new(),
            release_date: "2020-01-01".into(),
            poster_url: String::new(),
            backdrop_url: String::new(),
            vote_average: 7.0,
            vote_count: 100,
            genres: vec![sample_genre()],
            studios: Vec::new(),
            actors: Vec::new(),
            crew: Vec::new(),
        }
    }

    #[tokio::test]
    async fn roundtrip_movie() {
        let cache = MemoryCache::default();
        let movie = sample_movie(42);
        cache.add_movie(&movie).await;
        assert_eq!(cache.get_movie(42).await, Some(movie));
        assert_eq!(cache.get_movie(43).await, None);
    }

    #[tokio::test]
    async fn full_and_short_entries_are_distinct() {
        let cache = MemoryCache::default();
        let movie = sample_movie(1);
        cache.add_movie_short(&movie).await;
        assert!(cache.get_movie(1).await.is_none());
        assert!(cache.get_movie_short(1).await.is_some());
    }

    #[tokio::test]
    async fn adult_flag_separates_search_pages() {
        let cache = MemoryCache::default();
        let page = PaginatedResults {
            results: vec![sample_movie(1)],
            total_page: 1,
            total_result: 1,
        };
        cache.add_movie_search("dune", 1, true, &page).await;
        assert!(cache.get_movie_search("dune", 1, false).await.is_none());
        assert_eq!(cache.get_movie_search("dune", 1, true).await, Some(page));
    }

    #[tokio::test]
    async fn empty_page_is_cached() {
        let cache = MemoryCache::default();
        let empty: PaginatedResults<Movie> = PaginatedResults {
            results: Vec::new(),
            total_page: 0,
            total_result: 0,
        };
        cache.add_movie_search("nothing", 1, false, &empty).await;
        assert_eq!(
            cache.get_movie_search("nothing", 1, false).await,
            Some(empty)
        );
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss() {
        let cache = MemoryCache::new(Duration::from_millis(10), Duration::from_secs(3600));
        let genre = sample_genre();
        cache.add_movie_genre(&genre).await;
        assert!(cache.get_movie_genre(28).await.is_some());
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get_movie_genre(28).await.is_none());
    }

    #[tokio::test]
    async fn season_roundtrip() {
        let cache = MemoryCache::default();
        let episodes = vec![TVEpisode {
            id: 9,
            tv_show_id: 7,
            season_number: 2,
            episode_number: 1,
            name: "Pilot".into(),
            overview: String::new(),
            air_date: "2021-05-01".into(),
            poster_url: String::new(),
        }];
        cache.add_season(7, 2, &episodes).await;
        assert_eq!(cache.get_season(7, 2).await, Some(episodes));
        assert!(cache.get_season(7, 3).await.is_none());
    }
}
