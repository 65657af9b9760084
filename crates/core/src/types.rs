use serde::{Deserialize, Serialize};

/// Media category a discovery request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCategory {
    Movie,
    Series,
    Anime,
    Manga,
    Game,
    Book,
}

impl MediaCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
            Self::Anime => "anime",
            Self::Manga => "manga",
            Self::Game => "game",
            Self::Book => "book",
        }
    }

    /// Parse the `{mediaCategory}` path segment. Plural route names and
    /// singular aliases are both accepted.
    pub fn from_route(segment: &str) -> Option<Self> {
        match segment.trim().to_ascii_lowercase().as_str() {
            "movies" | "movie" => Some(Self::Movie),
            "series" => Some(Self::Series),
            "animes" | "anime" => Some(Self::Anime),
            "mangas" | "manga" => Some(Self::Manga),
            "games" | "game" => Some(Self::Game),
            "books" | "book" => Some(Self::Book),
            _ => None,
        }
    }

    /// The catalog that serves this category.
    pub fn provider(self) -> Provider {
        match self {
            Self::Movie | Self::Series => Provider::Tmdb,
            Self::Anime | Self::Manga => Provider::Jikan,
            Self::Game => Provider::Rawg,
            Self::Book => Provider::GoogleBooks,
        }
    }
}

impl std::fmt::Display for MediaCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract sort order, translated per provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Popularity,
    Newest,
    Rating,
    MostRated,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Popularity => "popularity",
            Self::Newest => "newest",
            Self::Rating => "rating",
            Self::MostRated => "most_rated",
        }
    }

    /// Unknown or missing values fall back to popularity.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("newest") => Self::Newest,
            Some("rating") => Self::Rating,
            Some("most_rated") => Self::MostRated,
            _ => Self::Popularity,
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External catalog source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Tmdb,
    Jikan,
    Rawg,
    GoogleBooks,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tmdb => "tmdb",
            Self::Jikan => "jikan",
            Self::Rawg => "rawg",
            Self::GoogleBooks => "google_books",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical genre shape shared by every catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

impl Genre {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
