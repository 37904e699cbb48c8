use async_graphql::{SimpleObject, ID};
use serde::{Deserialize, Deserializer};

/// One row of a list endpoint (search, trending, top rated).
#[derive(Debug, Clone, PartialEq, Deserialize, SimpleObject)]
#[graphql(name = "Movie", rename_fields = "snake_case")]
pub struct MovieSummary {
    #[serde(deserialize_with = "upstream_id")]
    pub id: ID,
    // TV and person rows from trending carry `name` instead of `title`.
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default = "zero", deserialize_with = "number_text")]
    pub vote_average: String,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, SimpleObject)]
#[graphql(rename_fields = "snake_case")]
pub struct MovieDetails {
    #[serde(deserialize_with = "upstream_id")]
    pub id: ID,
    pub title: String,
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: String,
    #[serde(default, deserialize_with = "optional_number_text")]
    pub revenue: Option<String>,
    #[serde(default = "zero", deserialize_with = "number_text")]
    pub vote_average: String,
    #[serde(default, deserialize_with = "optional_number_text")]
    pub vote_count: Option<String>,
    pub homepage: Option<String>,
}

fn upstream_id<'de, D>(deserializer: D) -> Result<ID, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(i64),
        Text(String),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => ID(n.to_string()),
        RawId::Text(s) => ID(s),
    })
}

// Numeric upstream values are exposed as strings; GraphQL `Int` cannot hold revenues past 2^31.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawNumber> for String {
    fn from(raw: RawNumber) -> Self {
        match raw {
            RawNumber::Number(n) => n.to_string(),
            RawNumber::Text(s) => s,
        }
    }
}

fn zero() -> String {
    "0".to_string()
}

fn number_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawNumber>::deserialize(deserializer)? {
        Some(raw) => raw.into(),
        None => zero(),
    })
}

fn optional_number_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawNumber>::deserialize(deserializer)?.map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn details_decode_from_upstream_shape() {
        let raw = json!({
            "adult": false,
            "backdrop_path": "/hZkgoQYus5vegHoetLkCJzb17zJ.jpg",
            "homepage": "http://www.foxmovies.com/movies/fight-club",
            "id": 550,
            "original_title": "Fight Club",
            "overview": "A ticking-time-bomb insomniac...",
            "poster_path": null,
            "release_date": "1999-10-15",
            "revenue": 100853753,
            "title": "Fight Club",
            "vote_average": 8.433,
            "vote_count": 26280
        });
        let movie: MovieDetails = serde_json::from_value(raw).unwrap();
        assert_eq!(movie.id, ID("550".to_string()));
        assert_eq!(movie.revenue.as_deref(), Some("100853753"));
        assert!(movie.poster_path.is_none());
        assert_eq!(movie.vote_count.as_deref(), Some("26280"));
        assert_eq!(movie.vote_average, "8.433");
    }

    #[test]
    fn revenue_past_i32_stays_exact() {
        let raw = json!({
            "id": 19995,
            "title": "Avatar",
            "original_title": "Avatar",
            "revenue": 2923706026i64,
            "vote_average": 7.6,
            "vote_count": null
        });
        let movie: MovieDetails = serde_json::from_value(raw).unwrap();
        assert_eq!(movie.revenue.as_deref(), Some("2923706026"));
        assert_eq!(movie.vote_average, "7.6");
        assert!(movie.vote_count.is_none());
        assert_eq!(movie.release_date, "");
    }

    #[test]
    fn summary_takes_name_when_title_is_absent() {
        let raw = json!({
            "id": 1399,
            "name": "Game of Thrones",
            "media_type": "tv",
            "vote_average": 8.4,
            "poster_path": "/1XS1oqL89opfnbLl8WnZY1O1uJx.jpg"
        });
        let row: MovieSummary = serde_json::from_value(raw).unwrap();
        assert_eq!(row.title, "Game of Thrones");
        assert_eq!(row.id, ID("1399".to_string()));
    }

    #[test]
    fn summary_defaults_missing_vote_average() {
        let raw = json!({ "id": 287, "name": "Brad Pitt", "media_type": "person" });
        let row: MovieSummary = serde_json::from_value(raw).unwrap();
        assert_eq!(row.vote_average, "0");
        assert!(row.poster_path.is_none());
    }
}
