use crate::error::SourceError;
use crate::http::read_json;
use cineast_models::{MovieDetails, MovieRecord};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The metadata backend's marker for a missing value
const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbMovie {
    title: Option<String>,
    year: Option<String>,
    released: Option<String>,
    runtime: Option<String>,
    genre: Option<String>,
    director: Option<String>,
    actors: Option<String>,
    plot: Option<String>,
    poster: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
    response: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbSearchResponse {
    #[serde(default)]
    search: Vec<OmdbMovie>,
    response: Option<String>,
    error: Option<String>,
}

fn available(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != NOT_AVAILABLE)
}

/// Leading digits of a text field: "1999" → 1999, "2010–2014" → 2010, "136 min" → 136
fn leading_number<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let digits: String = raw.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

pub(crate) fn parse_year(raw: &str) -> Option<i32> {
    leading_number(raw)
}

pub(crate) fn parse_runtime(raw: &str) -> Option<u32> {
    leading_number(raw)
}

/// "Action, Sci-Fi" → {"Action", "Sci-Fi"}
pub(crate) fn parse_genres(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|g| g.trim())
        .filter(|g| !g.is_empty() && *g != NOT_AVAILABLE)
        .map(|g| g.to_string())
        .collect()
}

fn rejected(response: &Option<String>) -> bool {
    response.as_deref().map(|r| r.eq_ignore_ascii_case("false")).unwrap_or(false)
}

impl OmdbMovie {
    fn into_record(self, fallback_id: &str) -> (MovieRecord, OmdbExtras) {
        let record = MovieRecord {
            id: available(self.imdb_id).unwrap_or_else(|| fallback_id.to_string()),
            title: available(self.title).unwrap_or_default(),
            year: self.year.as_deref().and_then(parse_year),
            genres: self.genre.as_deref().map(parse_genres).unwrap_or_default().into_iter().collect(),
            runtime_minutes: self.runtime.as_deref().and_then(parse_runtime),
            community_score: None,
            poster_url: available(self.poster),
        };
        let extras = OmdbExtras {
            released: available(self.released),
            plot: available(self.plot),
            director: available(self.director),
            actors: available(self.actors),
            imdb_rating: available(self.imdb_rating),
        };
        (record, extras)
    }
}

struct OmdbExtras {
    released: Option<String>,
    plot: Option<String>,
    director: Option<String>,
    actors: Option<String>,
    imdb_rating: Option<String>,
}

fn details_from(movie: OmdbMovie, movie_id: &str) -> Result<MovieDetails, SourceError> {
    if rejected(&movie.response) {
        let message = movie.error.unwrap_or_else(|| "unknown error".to_string());
        debug!("Metadata backend rejected {}: {}", movie_id, message);
        return Err(if message.to_lowercase().contains("not found") {
            SourceError::NotFound(movie_id.to_string())
        } else {
            SourceError::Api(message)
        });
    }
    let (record, extras) = movie.into_record(movie_id);
    Ok(MovieDetails {
        record,
        released: extras.released,
        plot: extras.plot,
        director: extras.director,
        actors: extras.actors,
        imdb_rating: extras.imdb_rating,
    })
}

fn hits_from(response: OmdbSearchResponse, query: &str) -> Result<Vec<MovieRecord>, SourceError> {
    if rejected(&response.response) {
        let message = response.error.unwrap_or_else(|| "unknown error".to_string());
        // "Movie not found!" is an empty result, not a failure
        if message.to_lowercase().contains("not found") {
            debug!("No metadata hits for '{}'", query);
            return Ok(Vec::new());
        }
        return Err(SourceError::Api(message));
    }
    Ok(response
        .search
        .into_iter()
        .filter(|hit| hit.imdb_id.is_some())
        .map(|hit| hit.into_record("").0)
        .collect())
}

/// `GET /?i={id}&apikey={key}[&plot=full]`
pub async fn get_movie(
    client: &Client,
    base: &str,
    api_key: &str,
    movie_id: &str,
    full_plot: bool,
) -> Result<MovieDetails, SourceError> {
    debug!("Metadata lookup for {} (full plot: {})", movie_id, full_plot);

    let mut request = client.get(base).query(&[("i", movie_id), ("apikey", api_key)]);
    if full_plot {
        request = request.query(&[("plot", "full")]);
    }
    let response = request.send().await?;
    let movie: OmdbMovie = read_json(response, "omdb ?i").await?;
    details_from(movie, movie_id)
}

/// `GET /?apikey={key}&s={query}&type=movie`
pub async fn search_movies(client: &Client, base: &str, api_key: &str, query: &str) -> Result<Vec<MovieRecord>, SourceError> {
    debug!("Metadata search for '{}'", query);

    let response = client
        .get(base)
        .query(&[("apikey", api_key), ("s", query), ("type", "movie")])
        .send()
        .await?;
    let search: OmdbSearchResponse = read_json(response, "omdb ?s").await?;
    hits_from(search, query)
}
