use std::time::Duration;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use crate::config::ResolverConfig;
use crate::domain::FilmMatch;

const API_KEY_HEADER: &str = "x-api-key";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const UNKNOWN_TITLE: &str = "Untitled";
const UNKNOWN_YEAR: &str = "...";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    films: Vec<FilmEntry>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct FilmEntry {
    film_id: i64,
    name_ru: Option<String>,
    name_en: Option<String>,
    year: Option<String>,
}

impl From<FilmEntry> for FilmMatch {
    fn from(value: FilmEntry) -> Self {
        let non_empty = |s: &String| !s.is_empty() && s != "null";
        Self {
            external_id: value.film_id.to_string(),
            title: value.name_ru.filter(non_empty)
                .or(value.name_en.filter(non_empty))
                .unwrap_or_else(|| UNKNOWN_TITLE.to_owned()),
            year: value.year.filter(non_empty)
                .unwrap_or_else(|| UNKNOWN_YEAR.to_owned()),
        }
    }
}

/// Client of the Kinopoisk Unofficial API which looks up a film by a free-text keyword.
#[derive(Clone)]
pub struct ContentResolver {
    client: reqwest::Client,
    api_url: reqwest::Url,
}

impl ContentResolver {
    pub fn new(config: ResolverConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_str(&config.api_key)?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url,
        })
    }

    /// Returns the first match or `None`. Network and decoding errors are logged and treated as no match.
    pub async fn resolve(&self, query: &str) -> Option<FilmMatch> {
        self.search(query).await
            .inspect_err(|e| log::error!("couldn't search for '{query}': {e}"))
            .ok()
            .flatten()
    }

    async fn search(&self, query: &str) -> anyhow::Result<Option<FilmMatch>> {
        let mut url = self.api_url.clone();
        url.query_pairs_mut().append_pair("keyword", query);
        let response: SearchResponse = self.client.get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let maybe_match = first_match(response);
        if maybe_match.is_none() {
            log::debug!("nothing was found for '{query}'");
        }
        Ok(maybe_match)
    }
}

fn first_match(response: SearchResponse) -> Option<FilmMatch> {
    response.films
        .into_iter()
        .next()
        .map(FilmMatch::from)
}

#[cfg(test)]
mod test {
    use super::{first_match, SearchResponse};

    fn parse(json: &str) -> SearchResponse {
        serde_json::from_str(json).expect("test JSON must be valid")
    }

    #[test]
    fn first_of_many() {
        let response = parse(r#"{
            "keyword": "матрица",
            "pagesCount": 1,
            "films": [
                {"filmId": 301, "nameRu": "Матрица", "nameEn": "The Matrix", "year": "1999", "rating": "8.5"},
                {"filmId": 298, "nameRu": "Матрица: Перезагрузка", "year": "2003"}
            ]
        }"#);
        let film = first_match(response).expect("the first film must be chosen");
        assert_eq!(film.external_id, "301");
        assert_eq!(film.title, "Матрица");
        assert_eq!(film.year, "1999");
    }

    #[test]
    fn title_and_year_fallbacks() {
        let response = parse(r#"{"films": [{"filmId": 1, "nameRu": null, "nameEn": "Solaris", "year": "null"}]}"#);
        let film = first_match(response).expect("a film must be found");
        assert_eq!(film.title, "Solaris");
        assert_eq!(film.year, "...");

        let response = parse(r#"{"films": [{"filmId": 2, "nameRu": "", "year": "2001"}]}"#);
        let film = first_match(response).expect("a film must be found");
        assert_eq!(film.title, "Untitled");
        assert_eq!(film.year, "2001");
    }

    #[test]
    fn nothing_found() {
        assert!(first_match(parse(r#"{"keyword": "qwerty", "films": []}"#)).is_none());
        assert!(first_match(parse(r#"{"message": "no films"}"#)).is_none());
    }
}
