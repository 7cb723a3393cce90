//! Board metadata extraction from board page HTML.
//!
//! Every field is optional on the site, so absence is never an error here.
//! Fields come back entity-decoded and trimmed, ready for display.
use once_cell::sync::Lazy;
use regex::Regex;

use super::entities;

/// Sidebar metadata scraped from a board page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardMetadata {
    pub description: Option<String>,
    pub category: Option<String>,
    /// Parsed from the comma-grouped views label. Absent or unparsable is 0.
    pub views: u64,
    pub tags: Vec<String>,
}

static DESCRIPTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<p class="item-desc[^"]*"[^>]*>([^<]*)</p>"#).unwrap());

static CATEGORY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<strong>Category:\s*</strong>\s*<span class="text-muted">\s*([^<]+)</span>"#)
        .unwrap()
});

static VIEWS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<strong>Views:\s*</strong>\s*<span class="text-muted">\s*([^<]+)</span>"#)
        .unwrap()
});

static TAGS_SECTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<strong>Tags:\s*</strong>(.*?)</div>").unwrap());

static TAG_ANCHOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"<a[^>]*>([^<]+)</a>").unwrap());

/// Pulls description, category, view count and tags out of a board page.
pub fn extract_board_metadata(html: &str) -> BoardMetadata {
    let description = DESCRIPTION
        .captures(html)
        .map(|cap| entities::decode(cap[1].trim()))
        .filter(|text| !text.is_empty());

    let category = CATEGORY
        .captures(html)
        .map(|cap| entities::decode(cap[1].trim()))
        .filter(|text| !text.is_empty());

    let views = VIEWS
        .captures(html)
        .map(|cap| parse_views(cap[1].trim()))
        .unwrap_or(0);

    let tags = TAGS_SECTION
        .captures(html)
        .map(|section| {
            TAG_ANCHOR
                .captures_iter(&section[1])
                .map(|cap| entities::decode(cap[1].trim()))
                .filter(|tag| !tag.is_empty())
                .collect()
        })
        .unwrap_or_default();

    BoardMetadata {
        description,
        category,
        views,
        tags,
    }
}

fn parse_views(label: &str) -> u64 {
    label.replace(',', "").parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD_PAGE: &str = r#"
        <p class="item-desc mb-0" data-toggle="tooltip">The best movie quotes &amp; lines</p>
        <div class="meta">
          <strong>Category: </strong> <span class="text-muted">Movies</span>
          <strong>Views: </strong> <span class="text-muted">1,234,567</span>
        </div>
        <div class="tags">
          <strong>Tags: </strong>
          <a href="/search/funny">funny</a>
          <a href="/search/quotes">quotes&#039;n&#039;stuff</a>
        </div>
    "#;

    #[test]
    fn full_metadata() {
        let meta = extract_board_metadata(BOARD_PAGE);
        assert_eq!(
            meta.description.as_deref(),
            Some("The best movie quotes & lines")
        );
        assert_eq!(meta.category.as_deref(), Some("Movies"));
        assert_eq!(meta.views, 1_234_567);
        assert_eq!(meta.tags, vec!["funny", "quotes'n'stuff"]);
    }

    #[test]
    fn missing_fields_are_not_errors() {
        let meta = extract_board_metadata("<html><body></body></html>");
        assert_eq!(meta, BoardMetadata::default());
    }

    #[test]
    fn unparsable_views_count_as_zero() {
        let html = r#"<strong>Views: </strong><span class="text-muted">lots</span>"#;
        assert_eq!(extract_board_metadata(html).views, 0);
    }

    #[test]
    fn empty_description_is_none() {
        let html = r#"<p class="item-desc"></p>"#;
        assert_eq!(extract_board_metadata(html).description, None);
    }
}
