//! Cache-through metadata client.
//!
//! Every lookup consults the [`MediaCache`] first, falls through to the
//! [`MediaProvider`] on a miss, and fills the cache on the way out. Upstream
//! errors short-circuit and are returned verbatim; cache writes after a
//! successful fetch are best-effort and can never fail the call.

use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use super::cache::MediaCache;
use super::provider::{
    image_url, CastDto, CompanyDto, CreditsDto, CrewDto, DiscoverFilter, EpisodeDto, GenreDto,
    MediaProvider, MovieDetailDto, MovieListItemDto, Page, PersonDetailDto, PersonListItemDto,
    TvDetailDto, TvListItemDto,
};
use super::types::{
    Actor, Genre, Movie, PaginatedResults, Person, Studio, TVEpisode, TVShow,
    BACKDROP_PLACEHOLDER_URL, POSTER_PLACEHOLDER_URL, PROFILE_PLACEHOLDER_URL,
};
use crate::error::{Error, Result};

/// Entries per page for paginated results assembled locally.
const PAGE_SIZE: usize = 20;
/// How many upstream pages feed the recent-releases lists.
const RECENT_PAGES: i32 = 5;
/// How many items the recent-releases lists keep after merging.
const RECENT_COUNT: usize = 20;

/// Cache-through fetcher over a remote metadata provider.
///
/// Cheap to clone; clones share the same provider and cache.
#[derive(Clone)]
pub struct MediaClient {
    provider: Arc<dyn MediaProvider>,
    cache: Arc<dyn MediaCache>,
}

impl MediaClient {
    pub fn new(provider: Arc<dyn MediaProvider>, cache: Arc<dyn MediaCache>) -> Self {
        Self { provider, cache }
    }

    // -----------------------------------------------------------------------
    // Details
    // -----------------------------------------------------------------------

    /// Full movie details including credits.
    ///
    /// On a cache miss the base details are fetched first and stored as the
    /// short variant before the credits call, so a concurrent short lookup
    /// can already be served.
    pub async fn get_movie(&self, id: i32) -> Result<Movie> {
        if let Some(movie) = self.cache.get_movie(id).await {
            debug!(id, "movie cache hit");
            return Ok(movie);
        }
        let detail = self.provider.movie_info(id).await?;
        let short = movie_from_detail(detail.clone(), None);
        self.cache.add_movie_short(&short).await;

        let credits = self.provider.movie_credits(id).await?;
        let movie = movie_from_detail(detail, Some(credits));
        self.cache.add_movie(&movie).await;
        Ok(movie)
    }

    /// Movie details without credits.
    pub async fn get_movie_short(&self, id: i32) -> Result<Movie> {
        if let Some(movie) = self.cache.get_movie_short(id).await {
            return Ok(movie);
        }
        let detail = self.provider.movie_info(id).await?;
        let movie = movie_from_detail(detail, None);
        self.cache.add_movie_short(&movie).await;
        Ok(movie)
    }

    /// Full TV show details including credits.
    pub async fn get_tv_show(&self, id: i32) -> Result<TVShow> {
        if let Some(tv) = self.cache.get_tv(id).await {
            debug!(id, "tv cache hit");
            return Ok(tv);
        }
        let detail = self.provider.tv_info(id).await?;
        let short = tv_from_detail(detail.clone(), None);
        self.cache.add_tv_short(&short).await;

        let credits = self.provider.tv_credits(id).await?;
        let tv = tv_from_detail(detail, Some(credits));
        self.cache.add_tv(&tv).await;
        Ok(tv)
    }

    /// TV show details without credits.
    pub async fn get_tv_show_short(&self, id: i32) -> Result<TVShow> {
        if let Some(tv) = self.cache.get_tv_short(id).await {
            return Ok(tv);
        }
        let detail = self.provider.tv_info(id).await?;
        let tv = tv_from_detail(detail, None);
        self.cache.add_tv_short(&tv).await;
        Ok(tv)
    }

    pub async fn get_tv_episode(
        &self,
        tv_id: i32,
        season: i32,
        episode: i32,
    ) -> Result<TVEpisode> {
        if let Some(ep) = self.cache.get_episode(tv_id, season, episode).await {
            return Ok(ep);
        }
        let dto = self.provider.tv_episode_info(tv_id, season, episode).await?;
        let ep = episode_from(tv_id, dto);
        self.cache.add_episode(&ep).await;
        Ok(ep)
    }

    pub async fn get_tv_season_episodes(&self, tv_id: i32, season: i32) -> Result<Vec<TVEpisode>> {
        if let Some(episodes) = self.cache.get_season(tv_id, season).await {
            return Ok(episodes);
        }
        let dto = self.provider.tv_season_info(tv_id, season).await?;
        let episodes: Vec<TVEpisode> = dto
            .episodes
            .into_iter()
            .map(|e| episode_from(tv_id, e))
            .collect();
        self.cache.add_season(tv_id, season, &episodes).await;
        Ok(episodes)
    }

    // -----------------------------------------------------------------------
    // Lists
    // -----------------------------------------------------------------------

    pub async fn get_popular_movies(&self, page: i32) -> Result<PaginatedResults<Movie>> {
        let p = self.provider.popular_movies(page).await?;
        Ok(page_from(p, movie_from_list_item))
    }

    pub async fn get_popular_tv_shows(&self, page: i32) -> Result<PaginatedResults<TVShow>> {
        let p = self.provider.popular_tv(page).await?;
        Ok(page_from(p, tv_from_list_item))
    }

    /// Most relevant recently released movies: the first five now-playing
    /// pages merged, the 20 most popular kept, newest first.
    pub async fn get_recent_movies(&self) -> Result<Vec<Movie>> {
        let mut items = Vec::new();
        for page in 1..=RECENT_PAGES {
            let p = self.provider.now_playing_movies(page).await?;
            items.extend(p.results);
        }
        sort_recent(&mut items, |m| m.popularity, |m| m.release_date.clone());
        Ok(items.into_iter().map(movie_from_list_item).collect())
    }

    /// Most relevant recently aired TV shows; same shaping as
    /// [`Self::get_recent_movies`].
    pub async fn get_recent_tv_shows(&self) -> Result<Vec<TVShow>> {
        let mut items = Vec::new();
        for page in 1..=RECENT_PAGES {
            let p = self.provider.airing_today_tv(page).await?;
            items.extend(p.results);
        }
        sort_recent(&mut items, |t| t.popularity, |t| t.first_air_date.clone());
        Ok(items.into_iter().map(tv_from_list_item).collect())
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    pub async fn search_movies(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Result<PaginatedResults<Movie>> {
        if let Some(results) = self.cache.get_movie_search(query, page, adult).await {
            return Ok(results);
        }
        let p = self.provider.search_movies(query, page, adult, None).await?;
        let results = page_from(p, movie_from_list_item);
        self.cache
            .add_movie_search(query, page, adult, &results)
            .await;
        Ok(results)
    }

    pub async fn search_movies_year(
        &self,
        query: &str,
        year: i32,
        page: i32,
    ) -> Result<PaginatedResults<Movie>> {
        let year_str = year.to_string();
        if let Some(results) = self
            .cache
            .get_movie_search_year(query, page, &year_str)
            .await
        {
            return Ok(results);
        }
        let p = self
            .provider
            .search_movies(query, page, false, Some(year))
            .await?;
        let results = page_from(p, movie_from_list_item);
        self.cache
            .add_movie_search_year(query, page, &year_str, &results)
            .await;
        Ok(results)
    }

    pub async fn search_tv_shows(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Result<PaginatedResults<TVShow>> {
        if let Some(results) = self.cache.get_tv_search(query, page, adult).await {
            return Ok(results);
        }
        let p = self.provider.search_tv(query, page, adult).await?;
        let results = page_from(p, tv_from_list_item);
        self.cache.add_tv_search(query, page, adult, &results).await;
        Ok(results)
    }

    pub async fn search_actors(
        &self,
        query: &str,
        page: i32,
        adult: bool,
    ) -> Result<PaginatedResults<Actor>> {
        if let Some(results) = self.cache.get_actor_search(query, page, adult).await {
            return Ok(results);
        }
        let p = self.provider.search_people(query, page, adult).await?;
        let results = page_from(p, actor_from_list_item);
        self.cache
            .add_actor_search(query, page, adult, &results)
            .await;
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Discover
    // -----------------------------------------------------------------------

    pub async fn get_movies_by_genre(
        &self,
        genre_id: i32,
        page: i32,
    ) -> Result<PaginatedResults<Movie>> {
        if let Some(results) = self.cache.get_movies_by_genre(genre_id, page).await {
            return Ok(results);
        }
        let p = self
            .provider
            .discover_movies(DiscoverFilter::Genre(genre_id), page)
            .await?;
        let results = page_from(p, movie_from_list_item);
        self.cache
            .add_movies_by_genre(genre_id, page, &results)
            .await;
        Ok(results)
    }

    pub async fn get_tv_shows_by_genre(
        &self,
        genre_id: i32,
        page: i32,
    ) -> Result<PaginatedResults<TVShow>> {
        if let Some(results) = self.cache.get_tvs_by_genre(genre_id, page).await {
            return Ok(results);
        }
        let p = self
            .provider
            .discover_tv(DiscoverFilter::Genre(genre_id), page)
            .await?;
        let results = page_from(p, tv_from_list_item);
        self.cache.add_tvs_by_genre(genre_id, page, &results).await;
        Ok(results)
    }

    pub async fn get_movies_by_actor(
        &self,
        actor_id: i32,
        page: i32,
    ) -> Result<PaginatedResults<Movie>> {
        if let Some(results) = self.cache.get_movies_by_actor(actor_id, page).await {
            return Ok(results);
        }
        let p = self
            .provider
            .discover_movies(DiscoverFilter::Cast(actor_id), page)
            .await?;
        let results = page_from(p, movie_from_list_item);
        self.cache
            .add_movies_by_actor(actor_id, page, &results)
            .await;
        Ok(results)
    }

    /// Movies a person is credited on as crew. Not cached: the key contract
    /// has no director-scoped namespace and actor ids would collide.
    pub async fn get_movies_by_director(
        &self,
        director_id: i32,
        page: i32,
    ) -> Result<PaginatedResults<Movie>> {
        let p = self
            .provider
            .discover_movies(DiscoverFilter::Crew(director_id), page)
            .await?;
        Ok(page_from(p, movie_from_list_item))
    }

    pub async fn get_movies_by_studio(
        &self,
        studio_id: i32,
        page: i32,
    ) -> Result<PaginatedResults<Movie>> {
        if let Some(results) = self.cache.get_movies_by_studio(studio_id, page).await {
            return Ok(results);
        }
        let p = self
            .provider
            .discover_movies(DiscoverFilter::Company(studio_id), page)
            .await?;
        let results = page_from(p, movie_from_list_item);
        self.cache
            .add_movies_by_studio(studio_id, page, &results)
            .await;
        Ok(results)
    }

    pub async fn get_tv_shows_by_network(
        &self,
        network_id: i32,
        page: i32,
    ) -> Result<PaginatedResults<TVShow>> {
        if let Some(results) = self.cache.get_tvs_by_network(network_id, page).await {
            return Ok(results);
        }
        let p = self
            .provider
            .discover_tv(DiscoverFilter::Network(network_id), page)
            .await?;
        let results = page_from(p, tv_from_list_item);
        self.cache
            .add_tvs_by_network(network_id, page, &results)
            .await;
        Ok(results)
    }

    /// TV shows a person appears in, one page of up to 20 shows.
    ///
    /// The credit list is fetched once, then each show in the requested page
    /// window is resolved concurrently. The output order matches the
    /// upstream credit order.
    pub async fn get_tv_shows_by_actor(
        &self,
        actor_id: i32,
        page: i32,
    ) -> Result<PaginatedResults<TVShow>> {
        if let Some(results) = self.cache.get_tvs_by_actor(actor_id, page).await {
            return Ok(results);
        }
        let ids = self.provider.person_tv_credits(actor_id).await?;
        let total = ids.len();
        let start = (page.max(1) as usize - 1) * PAGE_SIZE;
        let window: Vec<i32> = ids.into_iter().skip(start).take(PAGE_SIZE).collect();

        let mut handles: Vec<JoinHandle<Result<TVShow>>> = Vec::with_capacity(window.len());
        for id in window {
            let client = self.clone();
            handles.push(tokio::spawn(
                async move { client.get_tv_show_short(id).await },
            ));
        }

        let mut shows = Vec::with_capacity(handles.len());
        let mut first_err = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(show)) => shows.push(show),
                Ok(Err(e)) => {
                    if first_err.is_none() {
                        first_err = Some(e);
                    }
                }
                Err(e) => {
                    if first_err.is_none() {
                        first_err = Some(Error::Internal(format!("show lookup task failed: {e}")));
                    }
                }
            }
        }
        if let Some(e) = first_err {
            return Err(e);
        }

        let results = PaginatedResults {
            results: shows,
            total_page: total.div_ceil(PAGE_SIZE) as i32,
            total_result: total as i32,
        };
        self.cache.add_tvs_by_actor(actor_id, page, &results).await;
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Recommendations
    // -----------------------------------------------------------------------

    pub async fn get_movie_recommendations(&self, movie_id: i32) -> Result<Vec<Movie>> {
        if let Some(results) = self.cache.get_movie_recommendations(movie_id).await {
            return Ok(results);
        }
        let p = self.provider.movie_recommendations(movie_id).await?;
        let results: Vec<Movie> = p.results.into_iter().map(movie_from_list_item).collect();
        self.cache
            .add_movie_recommendations(movie_id, &results)
            .await;
        Ok(results)
    }

    pub async fn get_tv_show_recommendations(&self, tv_id: i32) -> Result<Vec<TVShow>> {
        if let Some(results) = self.cache.get_tv_recommendations(tv_id).await {
            return Ok(results);
        }
        let p = self.provider.tv_recommendations(tv_id).await?;
        let results: Vec<TVShow> = p.results.into_iter().map(tv_from_list_item).collect();
        self.cache.add_tv_recommendations(tv_id, &results).await;
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Release windows
    // -----------------------------------------------------------------------

    /// Episodes of the given shows airing within `[start, end]` inclusive,
    /// plus the shows that had at least one match (each listed once).
    ///
    /// One task per show fans out into one task per season; workers append
    /// under a shared lock and always run to completion. The first worker
    /// error, if any, is returned after the join.
    pub async fn get_tv_shows_releases(
        &self,
        tv_ids: &[i32],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(Vec<TVEpisode>, Vec<TVShow>)> {
        let collected: Arc<Mutex<(Vec<TVEpisode>, Vec<TVShow>)>> =
            Arc::new(Mutex::new((Vec::new(), Vec::new())));

        let mut handles: Vec<JoinHandle<Result<()>>> = Vec::with_capacity(tv_ids.len());
        for &tv_id in tv_ids {
            let client = self.clone();
            let collected = Arc::clone(&collected);
            handles.push(tokio::spawn(async move {
                let show = client.get_tv_show_short(tv_id).await?;

                let mut season_handles: Vec<JoinHandle<Result<()>>> =
                    Vec::with_capacity(show.seasons_count.max(0) as usize);
                for season in 1..=show.seasons_count {
                    let client = client.clone();
                    let collected = Arc::clone(&collected);
                    let show = show.clone();
                    season_handles.push(tokio::spawn(async move {
                        let episodes = client.get_tv_season_episodes(tv_id, season).await?;
                        let matched: Vec<TVEpisode> = episodes
                            .into_iter()
                            .filter(|e| date_in_window(&e.air_date, start, end))
                            .collect();
                        if !matched.is_empty() {
                            let mut guard = collected.lock();
                            let (episodes, shows) = &mut *guard;
                            if !shows.iter().any(|s| s.id == show.id) {
                                shows.push(show);
                            }
                            episodes.extend(matched);
                        }
                        Ok(())
                    }));
                }
                join_first_error(season_handles).await
            }));
        }
        join_first_error(handles).await?;

        let mut guard = collected.lock();
        let episodes = std::mem::take(&mut guard.0);
        let shows = std::mem::take(&mut guard.1);
        Ok((episodes, shows))
    }

    /// Movies among `movie_ids` released within `[start, end]` inclusive.
    pub async fn get_movies_releases(
        &self,
        movie_ids: &[i32],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Movie>> {
        let collected: Arc<Mutex<Vec<Movie>>> = Arc::new(Mutex::new(Vec::new()));

        let mut handles: Vec<JoinHandle<Result<()>>> = Vec::with_capacity(movie_ids.len());
        for &movie_id in movie_ids {
            let client = self.clone();
            let collected = Arc::clone(&collected);
            handles.push(tokio::spawn(async move {
                let movie = client.get_movie_short(movie_id).await?;
                if date_in_window(&movie.release_date, start, end) {
                    collected.lock().push(movie);
                }
                Ok(())
            }));
        }
        join_first_error(handles).await?;

        let movies = std::mem::take(&mut *collected.lock());
        Ok(movies)
    }

    // -----------------------------------------------------------------------
    // Genres, people, companies
    // -----------------------------------------------------------------------

    pub async fn get_movie_genre(&self, id: i32) -> Result<Genre> {
        if let Some(genre) = self.cache.get_movie_genre(id).await {
            return Ok(genre);
        }
        let genres = self.provider.movie_genres().await?;
        let genre = genres
            .into_iter()
            .find(|g| g.id == id)
            .map(genre_from)
            .ok_or_else(|| Error::not_found("movie genre", id))?;
        self.cache.add_movie_genre(&genre).await;
        Ok(genre)
    }

    pub async fn get_tv_genre(&self, id: i32) -> Result<Genre> {
        if let Some(genre) = self.cache.get_tv_genre(id).await {
            return Ok(genre);
        }
        let genres = self.provider.tv_genres().await?;
        let genre = genres
            .into_iter()
            .find(|g| g.id == id)
            .map(genre_from)
            .ok_or_else(|| Error::not_found("tv genre", id))?;
        self.cache.add_tv_genre(&genre).await;
        Ok(genre)
    }

    pub async fn get_movie_genres(&self) -> Result<Vec<Genre>> {
        let genres = self.provider.movie_genres().await?;
        Ok(genres.into_iter().map(genre_from).collect())
    }

    pub async fn get_tv_show_genres(&self) -> Result<Vec<Genre>> {
        let genres = self.provider.tv_genres().await?;
        Ok(genres.into_iter().map(genre_from).collect())
    }

    pub async fn get_actor(&self, id: i32) -> Result<Actor> {
        if let Some(actor) = self.cache.get_actor(id).await {
            return Ok(actor);
        }
        let detail = self.provider.person_info(id).await?;
        let actor = actor_from_detail(detail);
        self.cache.add_actor(&actor).await;
        Ok(actor)
    }

    pub async fn get_studio(&self, id: i32) -> Result<Studio> {
        let dto = self.provider.company_info(id).await?;
        Ok(studio_from(dto))
    }

    pub async fn get_network(&self, id: i32) -> Result<Studio> {
        let dto = self.provider.network_info(id).await?;
        Ok(studio_from(dto))
    }
}

/// Await every handle, keeping the first error encountered. Later workers
/// still run to completion; their outcomes are discarded once an error has
/// been recorded.
async fn join_first_error(handles: Vec<JoinHandle<Result<()>>>) -> Result<()> {
    let mut first_err = None;
    for handle in handles {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
            Err(e) => {
                if first_err.is_none() {
                    first_err = Some(Error::Internal(format!("worker task failed: {e}")));
                }
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn date_in_window(date: &str, start: NaiveDate, end: NaiveDate) -> bool {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(d) => start <= d && d <= end,
        Err(_) => false,
    }
}

/// Merge shaping for the recent-releases lists: most popular 20 overall,
/// then newest first. Items whose dates do not parse keep their relative
/// popularity order.
fn sort_recent<T>(
    items: &mut Vec<T>,
    popularity: impl Fn(&T) -> f32,
    release_date: impl Fn(&T) -> String,
) {
    items.sort_by(|a, b| {
        popularity(b)
            .partial_cmp(&popularity(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    items.truncate(RECENT_COUNT);
    items.sort_by(|a, b| {
        let da = NaiveDate::parse_from_str(&release_date(a), "%Y-%m-%d");
        let db = NaiveDate::parse_from_str(&release_date(b), "%Y-%m-%d");
        match (da, db) {
            (Ok(da), Ok(db)) => db.cmp(&da),
            _ => std::cmp::Ordering::Equal,
        }
    });
}

// ---------------------------------------------------------------------------
// Wire-to-entity conversion
// ---------------------------------------------------------------------------

fn genre_from(dto: GenreDto) -> Genre {
    Genre {
        id: dto.id,
        name: dto.name,
    }
}

fn studio_from(dto: CompanyDto) -> Studio {
    Studio {
        id: dto.id,
        name: dto.name,
        logo_url: image_url(dto.logo_path.as_deref(), POSTER_PLACEHOLDER_URL),
    }
}

fn cast_person(dto: CastDto) -> Person {
    Person {
        id: dto.id,
        name: dto.name,
        character: dto.character,
        profile_url: image_url(dto.profile_path.as_deref(), PROFILE_PLACEHOLDER_URL),
    }
}

fn crew_person(dto: CrewDto) -> Person {
    Person {
        id: dto.id,
        name: dto.name,
        character: dto.job,
        profile_url: image_url(dto.profile_path.as_deref(), PROFILE_PLACEHOLDER_URL),
    }
}

fn movie_from_detail(detail: MovieDetailDto, credits: Option<CreditsDto>) -> Movie {
    let (actors, crew) = split_credits(credits);
    Movie {
        id: detail.id,
        title: detail.title,
        overview: detail.overview,
        release_date: detail.release_date,
        poster_url: image_url(detail.poster_path.as_deref(), POSTER_PLACEHOLDER_URL),
        backdrop_url: image_url(detail.backdrop_path.as_deref(), BACKDROP_PLACEHOLDER_URL),
        vote_average: detail.vote_average,
        vote_count: detail.vote_count,
        genres: detail.genres.into_iter().map(genre_from).collect(),
        studios: detail
            .production_companies
            .into_iter()
            .map(studio_from)
            .collect(),
        actors,
        crew,
    }
}

fn movie_from_list_item(item: MovieListItemDto) -> Movie {
    Movie {
        id: item.id,
        title: item.title,
        overview: item.overview,
        release_date: item.release_date,
        poster_url: image_url(item.poster_path.as_deref(), POSTER_PLACEHOLDER_URL),
        backdrop_url: image_url(item.backdrop_path.as_deref(), BACKDROP_PLACEHOLDER_URL),
        vote_average: item.vote_average,
        vote_count: item.vote_count,
        genres: Vec::new(),
        studios: Vec::new(),
        actors: Vec::new(),
        crew: Vec::new(),
    }
}

fn tv_from_detail(detail: TvDetailDto, credits: Option<CreditsDto>) -> TVShow {
    let (actors, crew) = split_credits(credits);
    let next_episode = detail
        .next_episode_to_air
        .map(|e| episode_from(detail.id, e));
    TVShow {
        id: detail.id,
        title: detail.name,
        overview: detail.overview,
        release_date: detail.first_air_date,
        poster_url: image_url(detail.poster_path.as_deref(), POSTER_PLACEHOLDER_URL),
        backdrop_url: image_url(detail.backdrop_path.as_deref(), BACKDROP_PLACEHOLDER_URL),
        vote_average: detail.vote_average,
        vote_count: detail.vote_count,
        genres: detail.genres.into_iter().map(genre_from).collect(),
        studios: detail
            .production_companies
            .into_iter()
            .map(studio_from)
            .collect(),
        networks: detail.networks.into_iter().map(studio_from).collect(),
        actors,
        crew,
        status: detail.status,
        next_episode,
        seasons_count: detail.number_of_seasons,
        episodes_count: detail.number_of_episodes,
    }
}

fn tv_from_list_item(item: TvListItemDto) -> TVShow {
    TVShow {
        id: item.id,
        title: item.name,
        overview: item.overview,
        release_date: item.first_air_date,
        poster_url: image_url(item.poster_path.as_deref(), POSTER_PLACEHOLDER_URL),
        backdrop_url: image_url(item.backdrop_path.as_deref(), BACKDROP_PLACEHOLDER_URL),
        vote_average: item.vote_average,
        vote_count: item.vote_count,
        genres: Vec::new(),
        studios: Vec::new(),
        networks: Vec::new(),
        actors: Vec::new(),
        crew: Vec::new(),
        status: String::new(),
        next_episode: None,
        seasons_count: 0,
        episodes_count: 0,
    }
}

fn episode_from(tv_id: i32, dto: EpisodeDto) -> TVEpisode {
    TVEpisode {
        id: dto.id,
        tv_show_id: tv_id,
        season_number: dto.season_number,
        episode_number: dto.episode_number,
        name: dto.name,
        overview: dto.overview,
        air_date: dto.air_date,
        poster_url: image_url(dto.still_path.as_deref(), POSTER_PLACEHOLDER_URL),
    }
}

fn actor_from_detail(dto: PersonDetailDto) -> Actor {
    Actor {
        id: dto.id,
        name: dto.name,
        profile_url: image_url(dto.profile_path.as_deref(), PROFILE_PLACEHOLDER_URL),
        overview: dto.biography,
    }
}

fn actor_from_list_item(dto: PersonListItemDto) -> Actor {
    Actor {
        id: dto.id,
        name: dto.name,
        profile_url: image_url(dto.profile_path.as_deref(), PROFILE_PLACEHOLDER_URL),
        overview: String::new(),
    }
}

fn split_credits(credits: Option<CreditsDto>) -> (Vec<Person>, Vec<Person>) {
    match credits {
        Some(c) => (
            c.cast.into_iter().map(cast_person).collect(),
            c.crew.into_iter().map(crew_person).collect(),
        ),
        None => (Vec::new(), Vec::new()),
    }
}

fn page_from<T, U>(page: Page<T>, convert: impl Fn(T) -> U) -> PaginatedResults<U> {
    PaginatedResults {
        results: page.results.into_iter().map(convert).collect(),
        total_page: page.total_pages,
        total_result: page.total_results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_item(id: i32, popularity: f32, release_date: &str) -> MovieListItemDto {
        MovieListItemDto {
            id,
            title: format!("m{id}"),
            overview: String::new(),
            release_date: release_date.to_string(),
            poster_path: None,
            backdrop_path: None,
            vote_average: 0.0,
            vote_count: 0,
            popularity,
        }
    }

    #[test]
    fn sort_recent_keeps_top_by_popularity_then_orders_by_date() {
        let mut items: Vec<MovieListItemDto> = (0..30)
            .map(|i| list_item(i, i as f32, &format!("2024-01-{:02}", (i % 28) + 1)))
            .collect();
        sort_recent(&mut items, |m| m.popularity, |m| m.release_date.clone());

        assert_eq!(items.len(), 20);
        // Only the 20 most popular survive (popularity 10..=29).
        assert!(items.iter().all(|m| m.popularity >= 10.0));
        // Newest first.
        for pair in items.windows(2) {
            let a = NaiveDate::parse_from_str(&pair[0].release_date, "%Y-%m-%d").unwrap();
            let b = NaiveDate::parse_from_str(&pair[1].release_date, "%Y-%m-%d").unwrap();
            assert!(a >= b);
        }
    }

    #[test]
    fn sort_recent_is_stable_for_unparseable_dates() {
        let mut items = vec![
            list_item(1, 5.0, ""),
            list_item(2, 4.0, "garbage"),
            list_item(3, 3.0, ""),
        ];
        sort_recent(&mut items, |m| m.popularity, |m| m.release_date.clone());
        let ids: Vec<i32> = items.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn date_window_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert!(date_in_window("2024-01-01", start, end));
        assert!(date_in_window("2024-01-31", start, end));
        assert!(date_in_window("2024-01-15", start, end));
        assert!(!date_in_window("2023-12-31", start, end));
        assert!(!date_in_window("2024-02-01", start, end));
        assert!(!date_in_window("", start, end));
        assert!(!date_in_window("not-a-date", start, end));
    }

    #[test]
    fn list_item_conversion_uses_placeholders() {
        let movie = movie_from_list_item(list_item(1, 0.0, "2020-05-01"));
        assert_eq!(movie.poster_url, POSTER_PLACEHOLDER_URL);
        assert_eq!(movie.backdrop_url, BACKDROP_PLACEHOLDER_URL);
    }

    #[test]
    fn crew_job_maps_to_character_field() {
        let person = crew_person(CrewDto {
            id: 1,
            name: "Jane Doe".into(),
            job: "Director".into(),
            profile_path: Some("/p.jpg".into()),
        });
        assert_eq!(person.character, "Director");
        assert!(person.profile_url.ends_with("/p.jpg"));
    }
}
