//! Cache key construction.
//!
//! One source of truth for every key prefix, shared by both cache variants
//! so that they stay binary-compatible when pointed at the same store.
//! Search keys carry an `:adult` suffix when the adult flag is set, keeping
//! filtered and unfiltered result pages distinct.

pub fn movie(id: i32) -> String {
    format!("movie:{id}")
}

pub fn movie_short(id: i32) -> String {
    format!("movie_short:{id}")
}

pub fn tv(id: i32) -> String {
    format!("tv:{id}")
}

pub fn tv_short(id: i32) -> String {
    format!("tv_short:{id}")
}

pub fn episode(tv_id: i32, season: i32, episode: i32) -> String {
    format!("episode:{tv_id}:{season}:{episode}")
}

pub fn season(tv_id: i32, season: i32) -> String {
    format!("season:{tv_id}:{season}")
}

pub fn movie_search(query: &str, page: i32, adult: bool) -> String {
    with_adult(format!("movie_search:{query}:{page}"), adult)
}

pub fn movie_search_year(query: &str, page: i32, year: &str) -> String {
    format!("movie_search:{query}:{page}:{year}")
}

pub fn tv_search(query: &str, page: i32, adult: bool) -> String {
    with_adult(format!("tv_search:{query}:{page}"), adult)
}

pub fn actor_search(query: &str, page: i32, adult: bool) -> String {
    with_adult(format!("actor_search:{query}:{page}"), adult)
}

pub fn movies_by_genre(genre_id: i32, page: i32) -> String {
    format!("movies_by_genre:{genre_id}:{page}")
}

pub fn tvs_by_genre(genre_id: i32, page: i32) -> String {
    format!("tvs_by_genre:{genre_id}:{page}")
}

pub fn movies_by_actor(actor_id: i32, page: i32) -> String {
    format!("movies_by_actor:{actor_id}:{page}")
}

pub fn tvs_by_actor(actor_id: i32, page: i32) -> String {
    format!("tvs_by_actor:{actor_id}:{page}")
}

pub fn movies_by_studio(studio_id: i32, page: i32) -> String {
    format!("movies_by_studio:{studio_id}:{page}")
}

pub fn tvs_by_network(network_id: i32, page: i32) -> String {
    format!("tvs_by_network:{network_id}:{page}")
}

pub fn movie_recommendations(movie_id: i32) -> String {
    format!("movie_recommendations:{movie_id}")
}

pub fn tv_recommendations(tv_id: i32) -> String {
    format!("tv_recommendations:{tv_id}")
}

pub fn movie_genre(id: i32) -> String {
    format!("movie_genre:{id}")
}

pub fn tv_genre(id: i32) -> String {
    format!("tv_genre:{id}")
}

pub fn actor(id: i32) -> String {
    format!("actor:{id}")
}

fn with_adult(base: String, adult: bool) -> String {
    if adult {
        format!("{base}:adult")
    } else {
        base
    }
}
