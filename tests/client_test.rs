//! Client behavior through the provider and cache seams: cache-through
//! fills, release windowing, credit-page expansion, recent-list shaping.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;

use vodforge::error::{Error, Result};
use vodforge::metadata::provider::{
    CompanyDto, CreditsDto, DiscoverFilter, EpisodeDto, GenreDto, MediaProvider, MovieDetailDto,
    MovieListItemDto, Page, PersonDetailDto, PersonListItemDto, SeasonDetailDto, TvDetailDto,
    TvListItemDto,
};
use vodforge::metadata::{MediaClient, MemoryCache};

// ---------------------------------------------------------------------------
// Stub provider
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StubProvider {
    movies: HashMap<i32, MovieDetailDto>,
    tvs: HashMap<i32, TvDetailDto>,
    seasons: HashMap<(i32, i32), Vec<EpisodeDto>>,
    tv_credits_by_person: HashMap<i32, Vec<i32>>,
    now_playing_pages: Vec<Vec<MovieListItemDto>>,
    movie_genre_list: Vec<GenreDto>,
    search_results: Vec<MovieListItemDto>,
    calls: Mutex<Vec<String>>,
}

impl StubProvider {
    fn record(&self, call: impl Into<String>) {
        self.calls.lock().push(call.into());
    }

    fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

fn movie_detail(id: i32, release_date: &str) -> MovieDetailDto {
    MovieDetailDto {
        id,
        title: format!("movie{id}"),
        overview: String::new(),
        release_date: release_date.to_string(),
        poster_path: None,
        backdrop_path: None,
        vote_average: 7.0,
        vote_count: 10,
        genres: Vec::new(),
        production_companies: Vec::new(),
    }
}

fn tv_detail(id: i32, seasons: i32) -> TvDetailDto {
    TvDetailDto {
        id,
        name: format!("show{id}"),
        overview: String::new(),
        first_air_date: "2020-01-01".to_string(),
        poster_path: None,
        backdrop_path: None,
        vote_average: 8.0,
        vote_count: 20,
        genres: Vec::new(),
        production_companies: Vec::new(),
        networks: Vec::new(),
        status: "Returning Series".to_string(),
        next_episode_to_air: None,
        number_of_seasons: seasons,
        number_of_episodes: 0,
    }
}

fn episode(id: i32, season: i32, number: i32, air_date: &str) -> EpisodeDto {
    EpisodeDto {
        id,
        season_number: season,
        episode_number: number,
        name: format!("e{id}"),
        overview: String::new(),
        air_date: air_date.to_string(),
        still_path: None,
    }
}

fn list_item(id: i32, popularity: f32, release_date: &str) -> MovieListItemDto {
    MovieListItemDto {
        id,
        title: format!("movie{id}"),
        overview: String::new(),
        release_date: release_date.to_string(),
        poster_path: None,
        backdrop_path: None,
        vote_average: 0.0,
        vote_count: 0,
        popularity,
    }
}

fn page_of<T>(results: Vec<T>) -> Page<T> {
    Page {
        page: 1,
        total_pages: 1,
        total_results: results.len() as i32,
        results,
    }
}

#[async_trait]
impl MediaProvider for StubProvider {
    async fn movie_info(&self, id: i32) -> Result<MovieDetailDto> {
        self.record(format!("movie_info:{id}"));
        self.movies
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("movie", id))
    }

    async fn movie_credits(&self, id: i32) -> Result<CreditsDto> {
        self.record(format!("movie_credits:{id}"));
        Ok(CreditsDto {
            cast: Vec::new(),
            crew: Vec::new(),
        })
    }

    async fn tv_info(&self, id: i32) -> Result<TvDetailDto> {
        self.record(format!("tv_info:{id}"));
        self.tvs
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("tv show", id))
    }

    async fn tv_credits(&self, id: i32) -> Result<CreditsDto> {
        self.record(format!("tv_credits:{id}"));
        Ok(CreditsDto {
            cast: Vec::new(),
            crew: Vec::new(),
        })
    }

    async fn tv_episode_info(&self, tv_id: i32, season: i32, ep: i32) -> Result<EpisodeDto> {
        self.record(format!("tv_episode_info:{tv_id}:{season}:{ep}"));
        Err(Error::not_found("episode", ep))
    }

    async fn tv_season_info(&self, tv_id: i32, season: i32) -> Result<SeasonDetailDto> {
        self.record(format!("tv_season_info:{tv_id}:{season}"));
        Ok(SeasonDetailDto {
            episodes: self
                .seasons
                .get(&(tv_id, season))
                .cloned()
                .unwrap_or_default(),
        })
    }

    async fn search_movies(
        &self,
        query: &str,
        page: i32,
        adult: bool,
        _year: Option<i32>,
    ) -> Result<Page<MovieListItemDto>> {
        self.record(format!("search_movies:{query}:{page}:{adult}"));
        Ok(page_of(self.search_results.clone()))
    }

    async fn search_tv(
        &self,
        query: &str,
        page: i32,
        _adult: bool,
    ) -> Result<Page<TvListItemDto>> {
        self.record(format!("search_tv:{query}:{page}"));
        Ok(page_of(Vec::new()))
    }

    async fn search_people(
        &self,
        query: &str,
        page: i32,
        _adult: bool,
    ) -> Result<Page<PersonListItemDto>> {
        self.record(format!("search_people:{query}:{page}"));
        Ok(page_of(Vec::new()))
    }

    async fn discover_movies(
        &self,
        filter: DiscoverFilter,
        page: i32,
    ) -> Result<Page<MovieListItemDto>> {
        self.record(format!("discover_movies:{}:{}:{page}", filter.param(), filter.value()));
        Ok(page_of(Vec::new()))
    }

    async fn discover_tv(
        &self,
        filter: DiscoverFilter,
        page: i32,
    ) -> Result<Page<TvListItemDto>> {
        self.record(format!("discover_tv:{}:{}:{page}", filter.param(), filter.value()));
        Ok(page_of(Vec::new()))
    }

    async fn movie_recommendations(&self, id: i32) -> Result<Page<MovieListItemDto>> {
        self.record(format!("movie_recommendations:{id}"));
        Ok(page_of(Vec::new()))
    }

    async fn tv_recommendations(&self, id: i32) -> Result<Page<TvListItemDto>> {
        self.record(format!("tv_recommendations:{id}"));
        Ok(page_of(Vec::new()))
    }

    async fn now_playing_movies(&self, page: i32) -> Result<Page<MovieListItemDto>> {
        self.record(format!("now_playing:{page}"));
        let results = self
            .now_playing_pages
            .get(page as usize - 1)
            .cloned()
            .unwrap_or_default();
        Ok(Page {
            page,
            results,
            total_pages: self.now_playing_pages.len() as i32,
            total_results: 0,
        })
    }

    async fn airing_today_tv(&self, page: i32) -> Result<Page<TvListItemDto>> {
        self.record(format!("airing_today:{page}"));
        Ok(page_of(Vec::new()))
    }

    async fn popular_movies(&self, page: i32) -> Result<Page<MovieListItemDto>> {
        self.record(format!("popular_movies:{page}"));
        Ok(page_of(Vec::new()))
    }

    async fn popular_tv(&self, page: i32) -> Result<Page<TvListItemDto>> {
        self.record(format!("popular_tv:{page}"));
        Ok(page_of(Vec::new()))
    }

    async fn movie_genres(&self) -> Result<Vec<GenreDto>> {
        self.record("movie_genres");
        Ok(self.movie_genre_list.clone())
    }

    async fn tv_genres(&self) -> Result<Vec<GenreDto>> {
        self.record("tv_genres");
        Ok(Vec::new())
    }

    async fn person_info(&self, id: i32) -> Result<PersonDetailDto> {
        self.record(format!("person_info:{id}"));
        Ok(PersonDetailDto {
            id,
            name: format!("person{id}"),
            biography: "bio".to_string(),
            profile_path: None,
        })
    }

    async fn person_tv_credits(&self, id: i32) -> Result<Vec<i32>> {
        self.record(format!("person_tv_credits:{id}"));
        Ok(self
            .tv_credits_by_person
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn company_info(&self, id: i32) -> Result<CompanyDto> {
        self.record(format!("company_info:{id}"));
        Ok(CompanyDto {
            id,
            name: format!("studio{id}"),
            logo_path: None,
        })
    }

    async fn network_info(&self, id: i32) -> Result<CompanyDto> {
        self.record(format!("network_info:{id}"));
        Ok(CompanyDto {
            id,
            name: format!("network{id}"),
            logo_path: None,
        })
    }
}

fn client_with(provider: StubProvider) -> (MediaClient, Arc<StubProvider>) {
    let provider = Arc::new(provider);
    let client = MediaClient::new(provider.clone(), Arc::new(MemoryCache::default()));
    (client, provider)
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

// ---------------------------------------------------------------------------
// Cache-through behavior
// ---------------------------------------------------------------------------

#[tokio::test]
async fn movie_short_is_fetched_once() {
    let mut provider = StubProvider::default();
    provider.movies.insert(550, movie_detail(550, "1999-10-15"));
    let (client, provider) = client_with(provider);

    let first = client.get_movie_short(550).await.unwrap();
    let second = client.get_movie_short(550).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(provider.count("movie_info:550"), 1);
}

#[tokio::test]
async fn full_movie_fills_short_entry_too() {
    let mut provider = StubProvider::default();
    provider.movies.insert(550, movie_detail(550, "1999-10-15"));
    let (client, provider) = client_with(provider);

    client.get_movie(550).await.unwrap();
    // The short variant was cached during the full fetch.
    client.get_movie_short(550).await.unwrap();
    assert_eq!(provider.count("movie_info:550"), 1);
    assert_eq!(provider.count("movie_credits:550"), 1);
}

#[tokio::test]
async fn upstream_error_is_returned_and_not_cached() {
    let (client, provider) = client_with(StubProvider::default());

    assert!(client.get_movie_short(1).await.is_err());
    assert!(client.get_movie_short(1).await.is_err());
    // No cache entry was written; both calls hit the provider.
    assert_eq!(provider.count("movie_info:1"), 2);
}

#[tokio::test]
async fn empty_search_page_is_cached() {
    let (client, provider) = client_with(StubProvider::default());

    let first = client.search_movies("nothing", 1, false).await.unwrap();
    assert!(first.results.is_empty());
    let second = client.search_movies("nothing", 1, false).await.unwrap();
    assert!(second.results.is_empty());
    assert_eq!(provider.count("search_movies:nothing:1"), 1);
}

#[tokio::test]
async fn adult_and_safe_search_pages_are_distinct() {
    let (client, provider) = client_with(StubProvider::default());

    client.search_movies("dune", 1, true).await.unwrap();
    client.search_movies("dune", 1, false).await.unwrap();
    // Different cache keys, so both variants reach the provider.
    assert_eq!(provider.count("search_movies:dune:1"), 2);
}

#[tokio::test]
async fn genre_lookup_scans_list_and_caches() {
    let mut provider = StubProvider::default();
    provider.movie_genre_list = vec![
        GenreDto {
            id: 28,
            name: "Action".into(),
        },
        GenreDto {
            id: 35,
            name: "Comedy".into(),
        },
    ];
    let (client, provider) = client_with(provider);

    let genre = client.get_movie_genre(35).await.unwrap();
    assert_eq!(genre.name, "Comedy");
    client.get_movie_genre(35).await.unwrap();
    assert_eq!(provider.count("movie_genres"), 1);
}

#[tokio::test]
async fn unknown_genre_is_not_found() {
    let (client, _provider) = client_with(StubProvider::default());
    match client.get_movie_genre(999).await {
        Err(Error::NotFound { entity, id }) => {
            assert_eq!(entity, "movie genre");
            assert_eq!(id, "999");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Release windows
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tv_releases_keeps_window_and_lists_show_once() {
    let mut provider = StubProvider::default();
    provider.tvs.insert(1, tv_detail(1, 2));
    provider.tvs.insert(2, tv_detail(2, 1));
    provider.seasons.insert(
        (1, 1),
        vec![
            episode(11, 1, 1, "2023-12-31"),
            episode(12, 1, 2, "2024-01-01"),
        ],
    );
    provider.seasons.insert(
        (1, 2),
        vec![
            episode(21, 2, 1, "2024-01-15"),
            episode(22, 2, 2, "2024-02-01"),
        ],
    );
    provider
        .seasons
        .insert((2, 1), vec![episode(31, 1, 1, "2022-06-01")]);
    let (client, _provider) = client_with(provider);

    let (mut episodes, shows) = client
        .get_tv_shows_releases(&[1, 2], date("2024-01-01"), date("2024-01-31"))
        .await
        .unwrap();

    episodes.sort_by_key(|e| e.id);
    let ids: Vec<i32> = episodes.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![12, 21]);
    // Show 1 matched in two seasons but appears once; show 2 not at all.
    assert_eq!(shows.len(), 1);
    assert_eq!(shows[0].id, 1);
}

#[tokio::test]
async fn movie_releases_window_is_inclusive() {
    let mut provider = StubProvider::default();
    provider.movies.insert(1, movie_detail(1, "2024-01-01"));
    provider.movies.insert(2, movie_detail(2, "2024-01-31"));
    provider.movies.insert(3, movie_detail(3, "2023-12-31"));
    provider.movies.insert(4, movie_detail(4, "2024-02-01"));
    provider.movies.insert(5, movie_detail(5, ""));
    let (client, _provider) = client_with(provider);

    let mut movies = client
        .get_movies_releases(&[1, 2, 3, 4, 5], date("2024-01-01"), date("2024-01-31"))
        .await
        .unwrap();
    movies.sort_by_key(|m| m.id);
    let ids: Vec<i32> = movies.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

// ---------------------------------------------------------------------------
// Per-actor credit expansion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn tv_shows_by_actor_preserves_credit_order() {
    let mut provider = StubProvider::default();
    let ids: Vec<i32> = (1..=25).collect();
    for &id in &ids {
        provider.tvs.insert(id, tv_detail(id, 1));
    }
    provider.tv_credits_by_person.insert(7, ids.clone());
    let (client, provider) = client_with(provider);

    let page1 = client.get_tv_shows_by_actor(7, 1).await.unwrap();
    assert_eq!(page1.total_result, 25);
    assert_eq!(page1.total_page, 2);
    let got: Vec<i32> = page1.results.iter().map(|s| s.id).collect();
    assert_eq!(got, (1..=20).collect::<Vec<i32>>());

    let page2 = client.get_tv_shows_by_actor(7, 2).await.unwrap();
    let got: Vec<i32> = page2.results.iter().map(|s| s.id).collect();
    assert_eq!(got, (21..=25).collect::<Vec<i32>>());

    // The credit list itself was fetched once per page request.
    assert_eq!(provider.count("person_tv_credits:7"), 2);
}

#[tokio::test]
async fn tv_shows_by_actor_page_is_cached() {
    let mut provider = StubProvider::default();
    provider.tvs.insert(1, tv_detail(1, 1));
    provider.tv_credits_by_person.insert(7, vec![1]);
    let (client, provider) = client_with(provider);

    client.get_tv_shows_by_actor(7, 1).await.unwrap();
    client.get_tv_shows_by_actor(7, 1).await.unwrap();
    assert_eq!(provider.count("person_tv_credits:7"), 1);
}

// ---------------------------------------------------------------------------
// Recent lists
// ---------------------------------------------------------------------------

#[tokio::test]
async fn recent_movies_merges_pages_and_shapes_result() {
    let mut provider = StubProvider::default();
    // 25 movies across 5 pages; popularity equals the id.
    provider.now_playing_pages = (0..5)
        .map(|p| {
            (1..=5)
                .map(|i| {
                    let id = p * 5 + i;
                    list_item(id, id as f32, &format!("2024-03-{:02}", (id % 28) + 1))
                })
                .collect()
        })
        .collect();
    let (client, provider) = client_with(provider);

    let recent = client.get_recent_movies().await.unwrap();
    assert_eq!(recent.len(), 20);
    // The 5 least popular (ids 1-5) were cut.
    assert!(recent.iter().all(|m| m.id > 5));
    // Newest first.
    for pair in recent.windows(2) {
        assert!(pair[0].release_date >= pair[1].release_date);
    }
    // All five pages were pulled.
    for page in 1..=5 {
        assert_eq!(provider.count(&format!("now_playing:{page}")), 1);
    }
}

// ---------------------------------------------------------------------------
// Studios and networks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn studio_and_network_lookup() {
    let (client, _provider) = client_with(StubProvider::default());

    let studio = client.get_studio(33).await.unwrap();
    assert_eq!(studio.name, "studio33");
    let network = client.get_network(49).await.unwrap();
    assert_eq!(network.name, "network49");
}
