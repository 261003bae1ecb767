use reqwest::Url;

/// The best match returned by the content resolver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilmMatch {
    pub external_id: String,
    pub title: String,
    pub year: String,
}

impl FilmMatch {
    /// Link to the player page, which takes the film id and its title as query parameters.
    pub fn play_url(&self, web_app_url: &Url) -> Url {
        let mut url = web_app_url.clone();
        url.query_pairs_mut()
            .append_pair("id", &self.external_id)
            .append_pair("name", &self.title);
        url
    }
}

#[cfg(test)]
mod test {
    use reqwest::Url;
    use super::FilmMatch;

    #[test]
    fn play_url() {
        let film = FilmMatch {
            external_id: "301".to_owned(),
            title: "The Matrix & Co".to_owned(),
            year: "1999".to_owned(),
        };
        let base = Url::parse("https://player.example.org/watch").unwrap();
        assert_eq!(film.play_url(&base).as_str(),
                   "https://player.example.org/watch?id=301&name=The+Matrix+%26+Co");
    }

    #[test]
    fn play_url_keeps_existing_params() {
        let film = FilmMatch {
            external_id: "42".to_owned(),
            title: "Solaris".to_owned(),
            year: "1972".to_owned(),
        };
        let base = Url::parse("https://player.example.org/?theme=dark").unwrap();
        assert_eq!(film.play_url(&base).as_str(),
                   "https://player.example.org/?theme=dark&id=42&name=Solaris");
    }
}
