//! Pure, stateless functions that pull structured data out of raw board and
//! search page HTML.
//!
//! Everything here operates on full document text with compiled regexes. No
//! DOM is built, matching how little of the page structure the site actually
//! guarantees.
pub mod entities;
pub mod metadata;
pub mod sounds;

pub use metadata::{extract_board_metadata, BoardMetadata};
pub use sounds::{
    download_capability, extract_sound_records, DownloadAnchorStrategy, ExtractionStrategy,
    SoundRecord, TitleBlockStrategy,
};
