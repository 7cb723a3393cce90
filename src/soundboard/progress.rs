//! Presentation seam between the core pipelines and whatever front-end is
//! driving them.
//!
//! Core code reports events through [`SnagObserver`] and never touches the
//! terminal itself, so the CLI can render bars and colors while tests and
//! library callers plug in [`NoopObserver`].
use std::path::Path;

use super::board::{DownloadOutcome, SnagTotals};
use super::search::BoardSummary;

/// Receives progress events from board downloads and searches.
///
/// Every method has an empty default body, implementors override only what
/// they present.
pub trait SnagObserver: Send + Sync {
    /// A board page was fetched and validated, downloading is about to start.
    fn board_started(&self, _board: &str, _sounds: usize, _buttons: usize, _output_dir: &Path) {}

    /// One sound is about to be requested. `index` is 1-based.
    fn sound_started(&self, _index: usize, _total: usize, _sound_id: &str) {}

    /// A sound attempt finished with the given outcome.
    fn sound_finished(&self, _outcome: &DownloadOutcome) {}

    /// The consecutive-failure cutoff fired after `attempted` of `total`
    /// sounds.
    fn cutoff(&self, _failures: u32, _attempted: usize, _total: usize) {}

    /// The whole board run finished (normally or via cutoff).
    fn board_finished(&self, _totals: &SnagTotals, _output_dir: &Path) {}

    /// A search result page is about to be fetched.
    fn search_page(&self, _page: u64) {}

    /// A candidate board was fetched and analyzed during a search.
    fn board_analyzed(
        &self,
        _summary: &BoardSummary,
        _passed_filters: bool,
        _filter_reasons: &[String],
        _downloadable_so_far: usize,
        _target: usize,
    ) {
    }

    /// Free-form, non-fatal notice (created a directory, per-candidate error).
    fn note(&self, _message: &str) {}
}

/// Observer that swallows every event. Default for library callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SnagObserver for NoopObserver {}
