//! # Soundboard Downloader
//!
//! soundboard_downloader is a CLI utility to bulk download audio clips from
//! soundboard.com boards, with clean normalized filenames and a board search.
//!
//! The core pipelines (board download, search) live under [`soundboard`] and
//! are usable as a library; the CLI and terminal presentation sit on top.
pub mod cli;
pub mod progress_bars;
pub mod soundboard;

// Export the main downloader interface
pub use soundboard::board::{BoardDownloader, DownloadOutcome, SnagTotals};

pub use soundboard::error::{FetchError, SnagError};

pub use soundboard::extract::SoundRecord;

pub use soundboard::progress::{NoopObserver, SnagObserver};

// Export the search pipeline
pub use soundboard::search::{search, BoardSummary, SearchOpts, SearchResults};
