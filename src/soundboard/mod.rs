//! Site model for ```https://www.soundboard.com```.
//!
//! Centralizes the base URL, the User-Agent string and every URL the rest of
//! the crate needs to build, so the page-scraping modules never concatenate
//! URLs on their own.
use std::time::Duration;

use log::debug;
use reqwest::Url;

use self::error::SnagError;

pub mod board;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod filename;
pub mod progress;
pub mod search;

/// Base URL for the website.
pub const BASE_URL: &str = "https://www.soundboard.com";

/// The site serves empty pages to unknown clients, so every request carries a
/// desktop browser User-Agent.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Default pause between consecutive requests.
pub const REQUEST_DELAY: Duration = Duration::from_millis(500);

/// Hard cap on result pages walked during a search.
pub const MAX_SEARCH_PAGES: u64 = 10;

/// Returns the public page URL for a board.
#[inline]
pub fn board_url(board_name: &str) -> String {
    format!("{}/sb/{}", BASE_URL, board_name)
}

/// Returns the direct download endpoint for a single track.
#[inline]
pub fn download_url(sound_id: &str) -> String {
    format!("{}/track/download/{}", BASE_URL, sound_id)
}

/// Returns the search results URL for `query`. The first page omits the
/// `page` parameter entirely, matching how the site links its own pagination.
#[inline]
pub fn search_url(query: &str, page: u64) -> String {
    let encoded = urlencoding::encode(query);
    if page > 1 {
        format!("{}/search/{}?page={}", BASE_URL, encoded, page)
    } else {
        format!("{}/search/{}", BASE_URL, encoded)
    }
}

/// Extracts the board name from a full board page URL.
///
/// Accepts any URL whose path is `/sb/<name>`, with or without a trailing
/// slash.
pub fn board_name_from_url(url: &str) -> Result<String, SnagError> {
    let parsed = Url::parse(url).map_err(|_| SnagError::InvalidBoardUrl(url.to_string()))?;

    let name = parsed
        .path()
        .replace("/sb/", "")
        .replace('/', "")
        .trim()
        .to_string();

    if name.is_empty() {
        return Err(SnagError::InvalidBoardUrl(url.to_string()));
    }

    debug!("Board name from url: {}", name);
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_urls() {
        assert_eq!(
            board_url("movie-quotes"),
            "https://www.soundboard.com/sb/movie-quotes"
        );
        assert_eq!(
            download_url("412233"),
            "https://www.soundboard.com/track/download/412233"
        );
    }

    #[test]
    fn search_url_paging() {
        assert_eq!(
            search_url("air horn", 1),
            "https://www.soundboard.com/search/air%20horn"
        );
        assert_eq!(
            search_url("air horn", 3),
            "https://www.soundboard.com/search/air%20horn?page=3"
        );
    }

    #[test]
    fn board_name_parsing() {
        assert_eq!(
            board_name_from_url("https://www.soundboard.com/sb/movie-quotes").unwrap(),
            "movie-quotes"
        );
        assert_eq!(
            board_name_from_url("https://www.soundboard.com/sb/movie-quotes/").unwrap(),
            "movie-quotes"
        );
        assert!(board_name_from_url("not a url").is_err());
        assert!(board_name_from_url("https://www.soundboard.com/sb/").is_err());
    }
}
