//! Sound list extraction from board page HTML.
//!
//! Parsing is pluggable behind [`ExtractionStrategy`] so the markup drifts the
//! site ships every so often only cost us a new strategy, not a rewrite. The
//! driver tries the title-block layout first and falls back to bare download
//! anchors when the page uses an older template.
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// One playable track scraped from a board page.
///
/// `title` is the raw text between the title tags, entities and all. Decoding
/// happens at presentation/filename time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundRecord {
    pub id: String,
    pub title: String,
}

/// A way of recognizing sound entries in board page markup.
pub trait ExtractionStrategy {
    /// Short name used in debug logs.
    fn name(&self) -> &'static str;

    /// Returns every sound the strategy recognizes, in document order.
    fn extract(&self, html: &str) -> Vec<SoundRecord>;
}

static TITLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<div class="item r"[^>]*data-src="(\d+)"[^>]*>.*?<div class="item-title text-ellipsis">\s*<span>(.*?)</span>"#,
    )
    .unwrap()
});

static DOWNLOAD_ANCHOR_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<a href="/sb/sound/(\d+)"[^>]*class="btn-download-track""#).unwrap());

static DOWNLOAD_ANCHOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<a href="/sb/sound/\d+"[^>]*class="[^"]*btn-download-track"#).unwrap());

/// Matches the current board layout: an item container carrying `data-src`
/// with the title in a nested span.
pub struct TitleBlockStrategy;

impl ExtractionStrategy for TitleBlockStrategy {
    fn name(&self) -> &'static str {
        "title-block"
    }

    fn extract(&self, html: &str) -> Vec<SoundRecord> {
        TITLE_BLOCK
            .captures_iter(html)
            .map(|cap| SoundRecord {
                id: cap[1].to_string(),
                title: cap[2].to_string(),
            })
            .collect()
    }
}

/// Fallback for older board templates: only the download anchors carry ids,
/// titles are unavailable.
pub struct DownloadAnchorStrategy;

impl ExtractionStrategy for DownloadAnchorStrategy {
    fn name(&self) -> &'static str {
        "download-anchor"
    }

    fn extract(&self, html: &str) -> Vec<SoundRecord> {
        DOWNLOAD_ANCHOR_ID
            .captures_iter(html)
            .map(|cap| SoundRecord {
                id: cap[1].to_string(),
                title: String::new(),
            })
            .collect()
    }
}

/// Extracts the sound list from a board page, trying each known layout in
/// order of preference.
pub fn extract_sound_records(html: &str) -> Vec<SoundRecord> {
    let strategies: [&dyn ExtractionStrategy; 2] = [&TitleBlockStrategy, &DownloadAnchorStrategy];

    for strategy in strategies {
        let records = strategy.extract(html);
        if !records.is_empty() {
            debug!(
                "Strategy '{}' matched {} sounds",
                strategy.name(),
                records.len()
            );
            return records;
        }
        debug!("Strategy '{}' matched nothing", strategy.name());
    }
    Vec::new()
}

/// Reports whether the board allows downloads at all, along with how many
/// download buttons the page renders.
pub fn download_capability(html: &str) -> (bool, usize) {
    let count = DOWNLOAD_ANCHOR.find_iter(html).count();
    (count > 0, count)
}
