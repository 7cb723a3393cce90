//! Paginated board search with quality filters and ranking.
//!
//! Walks the site's search result pages, fetches each newly seen candidate
//! board, summarizes it and keeps going until enough downloadable boards
//! passed the filters or the results dry up.
use std::cmp::Reverse;
use std::time::Duration;

use ahash::AHashSet;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tokio::time::sleep;

use super::error::SnagError;
use super::extract::{
    download_capability, extract_board_metadata, extract_sound_records, entities, SoundRecord,
};
use super::fetch;
use super::progress::SnagObserver;
use super::{board_url, search_url, MAX_SEARCH_PAGES, REQUEST_DELAY};

/// How many sounds a summary carries as a preview.
pub const SAMPLE_SOUND_LIMIT: usize = 10;

/// Path segments under `/sb/` that are site navigation, not boards.
const NAV_SEGMENTS: [&str; 3] = ["search", "popular", "new"];

static BOARD_CANDIDATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/sb/([a-zA-Z0-9_-]+)").unwrap());

/// Everything the search learned about one candidate board.
#[derive(Debug, Clone)]
pub struct BoardSummary {
    pub name: String,
    pub has_downloads: bool,
    pub sound_count: usize,
    pub description: Option<String>,
    pub category: Option<String>,
    pub views: u64,
    pub tags: Vec<String>,
    /// First few sounds, titles entity-decoded for display.
    pub sample_sounds: Vec<SoundRecord>,
}

impl BoardSummary {
    pub fn url(&self) -> String {
        board_url(&self.name)
    }
}

/// Search tuning knobs, mirrored by the CLI flags.
#[derive(Debug, Clone)]
pub struct SearchOpts {
    /// Stop once this many downloadable, filter-passing boards were found.
    pub max_downloadable: usize,
    /// Minimum view count. Zero disables the check.
    pub min_views: u64,
    /// Minimum sound count. Zero disables the check.
    pub min_sounds: usize,
    /// Pause between consecutive requests.
    pub delay: Duration,
}

impl Default for SearchOpts {
    fn default() -> Self {
        Self {
            max_downloadable: 20,
            min_views: 10,
            min_sounds: 3,
            delay: REQUEST_DELAY,
        }
    }
}

/// Ranked outcome of a whole search run.
#[derive(Debug, Clone, Default)]
pub struct SearchResults {
    /// Downloadable, filter-passing boards, highest views first.
    pub boards: Vec<BoardSummary>,
    /// Downloadable boards that failed a filter.
    pub skipped_by_filters: usize,
}

/// Checks a candidate against the quality filters, returning the verdict and
/// a human-readable reason per failed filter.
fn passes_filters(views: u64, sound_count: usize, opts: &SearchOpts) -> (bool, Vec<String>) {
    let mut reasons = Vec::new();
    if opts.min_views > 0 && views < opts.min_views {
        reasons.push(format!(
            "views ({}) < min_views ({})",
            views, opts.min_views
        ));
    }
    if opts.min_sounds > 0 && sound_count < opts.min_sounds {
        reasons.push(format!(
            "sounds ({}) < min_sounds ({})",
            sound_count, opts.min_sounds
        ));
    }
    (reasons.is_empty(), reasons)
}

/// Extracts new candidate board names from one search result page, in first
/// appearance order. `seen` persists across pages so a name is only ever
/// analyzed once per search.
fn candidates_on_page(html: &str, seen: &mut AHashSet<String>) -> Vec<String> {
    let mut page_boards = Vec::new();
    for cap in BOARD_CANDIDATE.captures_iter(html) {
        let name = cap[1].to_string();
        if NAV_SEGMENTS.contains(&name.to_lowercase().as_str()) {
            continue;
        }
        if seen.insert(name.clone()) {
            page_boards.push(name);
        }
    }
    page_boards
}

/// Builds a summary from a fetched board page.
fn build_summary(name: &str, html: &str) -> BoardSummary {
    let records = extract_sound_records(html);
    let (has_downloads, _) = download_capability(html);
    let meta = extract_board_metadata(html);

    let sample_sounds = records
        .iter()
        .take(SAMPLE_SOUND_LIMIT)
        .map(|record| SoundRecord {
            id: record.id.clone(),
            title: entities::decode(record.title.trim()),
        })
        .collect();

    BoardSummary {
        name: name.to_string(),
        has_downloads,
        sound_count: records.len(),
        description: meta.description,
        category: meta.category,
        views: meta.views,
        tags: meta.tags,
        sample_sounds,
    }
}

/// Searches the site for boards matching `query`.
///
/// Candidate boards are analyzed in discovery order. The walk stops when
/// `opts.max_downloadable` qualifying boards were found, a page brings no new
/// names, the page limit is hit, or a search page fails to fetch.
pub async fn search(
    client: &Client,
    query: &str,
    opts: &SearchOpts,
    observer: &dyn SnagObserver,
) -> Result<SearchResults, SnagError> {
    let mut results = SearchResults::default();
    let mut seen = AHashSet::new();
    let mut downloadable = 0usize;

    'pages: for page in 1..=MAX_SEARCH_PAGES {
        observer.search_page(page);

        let html = match fetch::fetch_page(client, &search_url(query, page)).await {
            Ok(html) => html,
            Err(err) => {
                observer.note(&format!("Error searching page {}: {}", page, err));
                break;
            }
        };

        let page_boards = candidates_on_page(&html, &mut seen);
        debug!("Page {}: {} new candidates", page, page_boards.len());
        if page_boards.is_empty() {
            break;
        }

        for name in page_boards {
            if downloadable >= opts.max_downloadable {
                break 'pages;
            }

            let board_html = match fetch::fetch_page(client, &board_url(&name)).await {
                Ok(html) => html,
                Err(err) => {
                    observer.note(&format!("Error analyzing board {}: {}", name, err));
                    continue;
                }
            };

            let summary = build_summary(&name, &board_html);
            let (passed, reasons) = passes_filters(summary.views, summary.sound_count, opts);

            if passed && summary.has_downloads {
                downloadable += 1;
            }
            observer.board_analyzed(&summary, passed, &reasons, downloadable, opts.max_downloadable);

            if passed {
                results.boards.push(summary);
            } else if summary.has_downloads {
                results.skipped_by_filters += 1;
            }

            sleep(opts.delay).await;
        }

        if downloadable >= opts.max_downloadable {
            break;
        }
        sleep(opts.delay).await;
    }

    results.boards.retain(|board| board.has_downloads);
    // Stable sort keeps discovery order between equal view counts.
    results.boards.sort_by_key(|board| Reverse(board.views));

    Ok(results)
}
