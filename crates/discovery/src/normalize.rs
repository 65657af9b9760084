//! Provider item -> [`DiscoveryItem`] mappings.
//!
//! Every function is total: missing provider fields become `None`, an
//! "Unknown" title, or the placeholder description.

use medialog_core::types::{Genre, MediaCategory};
use medialog_metadata::google_books::{self, GoogleVolume};
use medialog_metadata::jikan::{JikanAnime, JikanEntry, JikanItem, JikanManga};
use medialog_metadata::rawg::RawgGame;
use medialog_metadata::tmdb::{self, TmdbItem};
use medialog_metadata::{non_blank, year_from_date};

use crate::DiscoveryItem;

const UNKNOWN_TITLE: &str = "Unknown";

/// Placeholder description for the configured UI language.
pub fn placeholder_description(language: &str) -> &'static str {
    let lang = language
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    match lang.as_str() {
        "fr" => "Aucune description disponible.",
        "de" => "Keine Beschreibung verfügbar.",
        "es" => "No hay descripción disponible.",
        "it" => "Nessuna descrizione disponibile.",
        "pt" => "Nenhuma descrição disponível.",
        _ => "No description available.",
    }
}

fn jikan_genres(entries: Vec<JikanEntry>) -> Vec<Genre> {
    entries
        .into_iter()
        .map(|g| Genre::new(g.mal_id.to_string(), g.name))
        .collect()
}

/// TMDB returns bare genre ids; `genres` is the resolved list for this item.
pub fn tmdb_item(item: TmdbItem, genres: Vec<Genre>, placeholder: &str) -> DiscoveryItem {
    match item {
        TmdbItem::Movie(m) => {
            let release_date = non_blank(m.release_date);
            let mut out = DiscoveryItem::new(
                m.id.to_string(),
                MediaCategory::Movie,
                non_blank(m.title)
                    .or(non_blank(m.original_title))
                    .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
                non_blank(m.overview).unwrap_or_else(|| placeholder.to_string()),
            );
            out.image_url = m.poster_path.as_deref().map(tmdb::poster_url);
            out.release_year = release_date.as_deref().and_then(year_from_date);
            out.release_date = release_date;
            out.rating = m.vote_average;
            out.ratings_count = m.vote_count;
            out.popularity = m.popularity;
            out.genres = genres;
            out
        }
        TmdbItem::Show(s) => {
            let release_date = non_blank(s.first_air_date);
            let mut out = DiscoveryItem::new(
                s.id.to_string(),
                MediaCategory::Series,
                non_blank(s.name)
                    .or(non_blank(s.original_name))
                    .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
                non_blank(s.overview).unwrap_or_else(|| placeholder.to_string()),
            );
            out.image_url = s.poster_path.as_deref().map(tmdb::poster_url);
            out.release_year = release_date.as_deref().and_then(year_from_date);
            out.release_date = release_date;
            out.rating = s.vote_average;
            out.ratings_count = s.vote_count;
            out.popularity = s.popularity;
            out.genres = genres;
            out
        }
    }
}

pub fn jikan_item(item: JikanItem, placeholder: &str) -> DiscoveryItem {
    match item {
        JikanItem::Anime(a) => anime(a, placeholder),
        JikanItem::Manga(m) => manga(m, placeholder),
    }
}

fn anime(a: JikanAnime, placeholder: &str) -> DiscoveryItem {
    let release_date = non_blank(a.aired.and_then(|d| d.from));
    let mut out = DiscoveryItem::new(
        a.mal_id.to_string(),
        MediaCategory::Anime,
        non_blank(a.title)
            .or(non_blank(a.title_english))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        non_blank(a.synopsis).unwrap_or_else(|| placeholder.to_string()),
    );
    out.image_url = a.images.best_url();
    out.release_year = a
        .year
        .or_else(|| release_date.as_deref().and_then(year_from_date));
    out.release_date = release_date;
    out.rating = a.score;
    out.ratings_count = a.scored_by;
    out.episodes = a.episodes;
    out.members = a.members;
    out.popularity = a.popularity.map(|p| p as f64);
    out.rank = a.rank;
    out.genres = jikan_genres(a.genres);
    out
}

fn manga(m: JikanManga, placeholder: &str) -> DiscoveryItem {
    let release_date = non_blank(m.published.and_then(|d| d.from));
    let authors: Vec<String> = m.authors.into_iter().map(|a| a.name).collect();
    let mut out = DiscoveryItem::new(
        m.mal_id.to_string(),
        MediaCategory::Manga,
        non_blank(m.title)
            .or(non_blank(m.title_english))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        non_blank(m.synopsis).unwrap_or_else(|| placeholder.to_string()),
    );
    out.image_url = m.images.best_url();
    out.release_year = release_date.as_deref().and_then(year_from_date);
    out.release_date = release_date;
    out.rating = m.score;
    out.ratings_count = m.scored_by;
    out.volumes = m.volumes;
    out.chapters = m.chapters;
    out.authors = (!authors.is_empty()).then_some(authors);
    out.members = m.members;
    out.popularity = m.popularity.map(|p| p as f64);
    out.rank = m.rank;
    out.genres = jikan_genres(m.genres);
    out
}

pub fn rawg_game(game: RawgGame, placeholder: &str) -> DiscoveryItem {
    let release_date = non_blank(game.released);
    let platforms: Vec<String> = game
        .platforms
        .unwrap_or_default()
        .into_iter()
        .map(|p| p.platform.name)
        .filter(|name| !name.is_empty())
        .collect();

    let mut out = DiscoveryItem::new(
        game.id.to_string(),
        MediaCategory::Game,
        non_blank(game.name).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        non_blank(game.description_raw).unwrap_or_else(|| placeholder.to_string()),
    );
    out.image_url = non_blank(game.background_image);
    out.release_year = release_date.as_deref().and_then(year_from_date);
    out.release_date = release_date;
    out.rating = game.rating;
    out.ratings_count = game.ratings_count;
    out.metacritic = game.metacritic;
    out.playtime = game.playtime;
    out.platforms = (!platforms.is_empty()).then_some(platforms);
    out.genres = game
        .genres
        .unwrap_or_default()
        .into_iter()
        .map(|g| Genre::new(g.id.to_string(), g.name))
        .collect();
    out
}

pub fn google_book(volume: GoogleVolume, placeholder: &str) -> DiscoveryItem {
    let info = volume.volume_info;
    let release_date = non_blank(info.published_date);
    let image = info
        .image_links
        .and_then(|links| non_blank(links.thumbnail).or(non_blank(links.small_thumbnail)));

    let mut out = DiscoveryItem::new(
        volume.id,
        MediaCategory::Book,
        non_blank(info.title).unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        non_blank(info.description).unwrap_or_else(|| placeholder.to_string()),
    );
    out.image_url = image.as_deref().map(google_books::secure_image_url);
    out.release_year = release_date.as_deref().and_then(year_from_date);
    out.release_date = release_date;
    out.rating = info.average_rating;
    out.ratings_count = info.ratings_count;
    out.authors = (!info.authors.is_empty()).then_some(info.authors);
    out.genres = info
        .categories
        .into_iter()
        .map(|c| Genre::new(c.clone(), c))
        .collect();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use medialog_metadata::google_books::{ImageLinks, VolumeInfo};
    use medialog_metadata::jikan::{JikanDateRange, JikanImageSet, JikanImages};
    use medialog_metadata::rawg::{RawgNamed, RawgPlatformEntry};
    use medialog_metadata::tmdb::{TmdbMovie, TmdbShow};

    const PLACEHOLDER: &str = "No description available.";

    #[test]
    fn tmdb_movie_maps_fields() {
        let movie = TmdbMovie {
            id: 27205,
            title: Some("Inception".into()),
            overview: Some("".into()),
            poster_path: Some("/p.jpg".into()),
            release_date: Some("2010-07-16".into()),
            vote_average: Some(8.4),
            vote_count: Some(35000),
            genre_ids: vec![28],
            ..Default::default()
        };
        let item = tmdb_item(
            TmdbItem::Movie(movie),
            vec![Genre::new("28", "Action")],
            PLACEHOLDER,
        );
        assert_eq!(item.id, "27205");
        assert_eq!(item.media_type, MediaCategory::Movie);
        assert_eq!(item.description, PLACEHOLDER);
        assert_eq!(item.release_year, Some(2010));
        assert_eq!(item.image_url.as_deref(), Some("https://image.tmdb.org/t/p/w500/p.jpg"));
        assert_eq!(item.genres[0].name, "Action");
    }

    #[test]
    fn tmdb_show_without_date_has_no_year() {
        let show = TmdbShow {
            id: 1,
            original_name: Some("Original".into()),
            first_air_date: Some("".into()),
            ..Default::default()
        };
        let item = tmdb_item(TmdbItem::Show(show), Vec::new(), PLACEHOLDER);
        assert_eq!(item.title, "Original");
        assert_eq!(item.release_date, None);
        assert_eq!(item.release_year, None);
        assert_eq!(item.media_type, MediaCategory::Series);
    }

    #[test]
    fn anime_prefers_explicit_year() {
        let anime = JikanAnime {
            mal_id: 1,
            title: Some("Cowboy Bebop".into()),
            synopsis: Some("Space bounty hunters.".into()),
            year: Some(1998),
            aired: Some(JikanDateRange {
                from: Some("1997-04-03T00:00:00+00:00".into()),
            }),
            episodes: Some(26),
            images: JikanImages {
                jpg: Some(JikanImageSet {
                    image_url: Some("https://cdn/cb.jpg".into()),
                    large_image_url: None,
                }),
            },
            genres: vec![JikanEntry { mal_id: 1, name: "Action".into() }],
            ..Default::default()
        };
        let item = jikan_item(JikanItem::Anime(anime), PLACEHOLDER);
        assert_eq!(item.release_year, Some(1998));
        assert_eq!(item.release_date.as_deref(), Some("1997-04-03T00:00:00+00:00"));
        assert_eq!(item.episodes, Some(26));
        assert_eq!(item.image_url.as_deref(), Some("https://cdn/cb.jpg"));
        assert_eq!(item.genres, vec![Genre::new("1", "Action")]);
    }

    #[test]
    fn anime_year_falls_back_to_aired_date() {
        let anime = JikanAnime {
            mal_id: 2,
            aired: Some(JikanDateRange {
                from: Some("2009-04-05T00:00:00+00:00".into()),
            }),
            ..Default::default()
        };
        let item = jikan_item(JikanItem::Anime(anime), PLACEHOLDER);
        assert_eq!(item.release_year, Some(2009));
        assert_eq!(item.title, "Unknown");
        assert_eq!(item.description, PLACEHOLDER);
    }

    #[test]
    fn manga_maps_volumes_and_authors() {
        let manga = JikanManga {
            mal_id: 2,
            title: Some("Berserk".into()),
            volumes: Some(41),
            authors: vec![JikanEntry { mal_id: 1868, name: "Miura, Kentarou".into() }],
            ..Default::default()
        };
        let item = jikan_item(JikanItem::Manga(manga), PLACEHOLDER);
        assert_eq!(item.volumes, Some(41));
        assert_eq!(item.chapters, None);
        assert_eq!(item.authors, Some(vec!["Miura, Kentarou".to_string()]));
    }

    #[test]
    fn rawg_game_maps_platforms() {
        let game = RawgGame {
            id: 3498,
            name: Some("Grand Theft Auto V".into()),
            released: Some("2013-09-17".into()),
            metacritic: Some(92),
            playtime: Some(74),
            platforms: Some(vec![RawgPlatformEntry {
                platform: RawgNamed { id: 4, name: "PC".into() },
            }]),
            genres: Some(vec![RawgNamed { id: 4, name: "Action".into() }]),
            ..Default::default()
        };
        let item = rawg_game(game, PLACEHOLDER);
        assert_eq!(item.platforms, Some(vec!["PC".to_string()]));
        assert_eq!(item.metacritic, Some(92));
        assert_eq!(item.release_year, Some(2013));
        assert_eq!(item.genres, vec![Genre::new("4", "Action")]);
        assert_eq!(item.description, PLACEHOLDER);
    }

    #[test]
    fn google_book_maps_categories_and_https_thumbnail() {
        let volume = GoogleVolume {
            id: "zyTCAlFPjgYC".into(),
            volume_info: VolumeInfo {
                title: Some("The Google Story".into()),
                authors: vec!["David A. Vise".into()],
                published_date: Some("2005".into()),
                categories: vec!["Business & Economics".into()],
                image_links: Some(ImageLinks {
                    small_thumbnail: None,
                    thumbnail: Some("http://books.google.com/t.jpg".into()),
                }),
                ..Default::default()
            },
        };
        let item = google_book(volume, PLACEHOLDER);
        assert_eq!(item.release_year, Some(2005));
        assert_eq!(item.image_url.as_deref(), Some("https://books.google.com/t.jpg"));
        assert_eq!(
            item.genres,
            vec![Genre::new("Business & Economics", "Business & Economics")]
        );
        assert_eq!(item.authors, Some(vec!["David A. Vise".to_string()]));
    }

    #[test]
    fn placeholder_follows_language() {
        assert_eq!(placeholder_description("fr-FR"), "Aucune description disponible.");
        assert_eq!(placeholder_description("en-US"), "No description available.");
        assert_eq!(placeholder_description(""), "No description available.");
    }

    #[test]
    fn serialized_item_omits_foreign_category_fields() {
        let item = DiscoveryItem::new("1", MediaCategory::Movie, "T", "D");
        let json = serde_json::to_value(&item).unwrap();
        assert!(json.get("episodes").is_none());
        assert!(json.get("platforms").is_none());
        assert_eq!(json["mediaType"], "movie");
        assert!(json["imageUrl"].is_null());
    }
}
