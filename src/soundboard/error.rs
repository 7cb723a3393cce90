use reqwest::StatusCode;
use thiserror::Error;

/// Enumerates the ways a single HTTP exchange with the site can fail.
///
/// Kept separate from [`SnagError`] so callers that only fetch pages (the
/// search walker, for instance) can match on transport-level failures without
/// dragging in the whole download-state error surface.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request never completed (connection refused, DNS failure, timeout).
    /// Wraps the underlying `reqwest::Error`.
    #[error("Connection error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status code.
    #[error("Server returned status {0}")]
    Status(StatusCode),

    /// The response body arrived but could not be decoded as UTF-8 text.
    #[error("Response body is not valid text: {0}")]
    Decode(String),
}

/// Enumerates the possible errors that can arise while snagging a board or
/// searching the site.
#[derive(Error, Debug)]
pub enum SnagError {
    /// An HTTP exchange failed. Wraps a [`FetchError`] with the specifics.
    #[error("Request failed: {0}")]
    Fetch(#[from] FetchError),

    /// The board page parsed cleanly but contained no recognizable sounds.
    #[error("No sounds found on this board")]
    NoSounds,

    /// The board exists and lists sounds, but its owner disabled downloads.
    /// `sounds` is how many play-only tracks the page showed.
    #[error("This board has {sounds} sounds but downloads are disabled")]
    DownloadsDisabled { sounds: usize },

    /// The given URL does not point at a board page.
    #[error("Not a valid board URL: {0}")]
    InvalidBoardUrl(String),

    /// A filesystem operation failed (creating the output dir, writing a file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
