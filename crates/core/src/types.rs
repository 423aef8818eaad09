use serde::{Deserialize, Serialize};

/// Catalog section a request targets.
///
/// Anything the UI sends other than `"tv"` is treated as a movie request,
/// including a missing field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum MediaType {
    #[default]
    Movie,
    Tv,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    /// Normalise a free-form media type string.
    pub fn resolve(raw: &str) -> Self {
        if raw == "tv" { Self::Tv } else { Self::Movie }
    }
}

impl From<String> for MediaType {
    fn from(raw: String) -> Self {
        Self::resolve(&raw)
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One title as shown in the search and trending grids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: i64,
    pub title: String,
    /// First four characters of the release or first-air date, or empty.
    pub year: String,
    pub poster_path: Option<String>,
    #[serde(rename = "poster_full")]
    pub poster_full_url: Option<String>,
}

/// Trending rows share the search row shape.
pub type TrendingResultItem = SearchResultItem;

/// Poster chosen by a random pick, forwarded to the UI or inserted directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomPickCandidate {
    pub poster_path: String,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_media_types_fall_back_to_movie() {
        assert_eq!(MediaType::resolve("tv"), MediaType::Tv);
        assert_eq!(MediaType::resolve("movie"), MediaType::Movie);
        assert_eq!(MediaType::resolve("anime"), MediaType::Movie);
        assert_eq!(MediaType::resolve(""), MediaType::Movie);
        assert_eq!(MediaType::resolve("TV"), MediaType::Movie);
    }

    #[test]
    fn media_type_deserializes_leniently() {
        let tv: MediaType = serde_json::from_value(serde_json::json!("tv")).unwrap();
        let other: MediaType = serde_json::from_value(serde_json::json!("music")).unwrap();
        assert_eq!(tv, MediaType::Tv);
        assert_eq!(other, MediaType::Movie);
    }

    #[test]
    fn result_item_uses_ui_field_names() {
        let item = SearchResultItem {
            id: 603,
            title: "The Matrix".into(),
            year: "1999".into(),
            poster_path: Some("/m.jpg".into()),
            poster_full_url: Some("https://img/w500/m.jpg".into()),
        };
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["poster_path"], "/m.jpg");
        assert_eq!(json["poster_full"], "https://img/w500/m.jpg");
        assert!(json.get("poster_full_url").is_none());
    }
}
