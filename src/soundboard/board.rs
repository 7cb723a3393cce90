//! Per-board download state machine.
//!
//! A run walks: fetch page, check download capability, extract the sound
//! list, then download each track sequentially with a politeness delay, a
//! filename-collision skip and a consecutive-failure cutoff.
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::debug;
use reqwest::Client;
use tokio::fs::{create_dir_all, remove_dir};
use tokio::time::sleep;

use super::error::SnagError;
use super::extract::{download_capability, extract_sound_records, SoundRecord};
use super::fetch;
use super::filename;
use super::progress::SnagObserver;
use super::{board_name_from_url, board_url, download_url};

/// Stop a board run after this many failures in an immediate row.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 2;

/// Result of one attempted sound download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// The file was fetched and written.
    Saved { filename: String, size_bytes: u64 },
    /// A file with the final name already existed, nothing was written.
    Skipped { filename: String },
    /// The attempt failed. `reason` is a display string for the report line.
    Failed { reason: String },
}

/// Running counters for one board run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnagTotals {
    pub saved: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl SnagTotals {
    fn record(&mut self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Saved { .. } => self.saved += 1,
            DownloadOutcome::Skipped { .. } => self.skipped += 1,
            DownloadOutcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Tracks the run of immediately consecutive failures. Saves and skips reset
/// the streak.
#[derive(Debug, Default)]
struct FailureStreak {
    run: u32,
}

impl FailureStreak {
    /// Feeds one outcome in and reports whether the cutoff has been reached.
    fn observe(&mut self, outcome: &DownloadOutcome) -> bool {
        match outcome {
            DownloadOutcome::Failed { .. } => {
                self.run += 1;
                self.run >= MAX_CONSECUTIVE_FAILURES
            }
            _ => {
                self.run = 0;
                false
            }
        }
    }
}

/// Derives the final filename for a track.
///
/// The page title wins over the server-supplied header filename, which is
/// usually an opaque asset hash. With neither, the canonical id-based name is
/// used.
fn plan_filename(record: &SoundRecord, header_name: Option<&str>) -> String {
    let title = record.title.trim();
    let raw = if !title.is_empty() {
        format!("{}.mp3", title)
    } else {
        header_name.unwrap_or_default().to_string()
    };
    filename::normalize(&raw, &record.id, title)
}

pub struct BoardDownloader {
    board_name: String,
    download_root: PathBuf,
    delay: Duration,
    client: Client,
}

impl BoardDownloader {
    /// Creates a downloader for the named board. `download_root` defaults to
    /// the current directory.
    pub fn new(
        board_name: &str,
        download_root: Option<PathBuf>,
        delay: Duration,
    ) -> Result<Self, SnagError> {
        let client = fetch::client()?;

        let root = match download_root {
            None => std::env::current_dir()?,
            Some(dir) => dir,
        };

        debug!("Download root: {}", root.display());
        Ok(Self {
            board_name: board_name.to_string(),
            download_root: root,
            delay,
            client,
        })
    }

    /// Creates a downloader from a full board page URL.
    pub fn from_url(
        url: &str,
        download_root: Option<PathBuf>,
        delay: Duration,
    ) -> Result<Self, SnagError> {
        let name = board_name_from_url(url)?;
        Self::new(&name, download_root, delay)
    }

    pub fn board_name(&self) -> &str {
        &self.board_name
    }

    /// Target directory for this board, derived from (root, board name).
    pub fn output_dir(&self) -> PathBuf {
        self.download_root.join(&self.board_name)
    }

    /// Runs the whole board download, reporting progress through `observer`.
    pub async fn snag(&self, observer: &dyn SnagObserver) -> Result<SnagTotals, SnagError> {
        let page = fetch::fetch_page(&self.client, &board_url(&self.board_name)).await?;

        let (has_downloads, button_count) = download_capability(&page);
        let records = extract_sound_records(&page);

        if records.is_empty() {
            return Err(SnagError::NoSounds);
        }
        if !has_downloads {
            return Err(SnagError::DownloadsDisabled {
                sounds: records.len(),
            });
        }

        let out_dir = self.output_dir();
        create_dir_all(&out_dir).await?;
        observer.board_started(&self.board_name, records.len(), button_count, &out_dir);

        let total = records.len();
        let mut totals = SnagTotals::default();
        let mut streak = FailureStreak::default();

        for (i, record) in records.iter().enumerate() {
            let attempted = i + 1;
            observer.sound_started(attempted, total, &record.id);

            let outcome = self.snag_sound(record, &out_dir).await;
            totals.record(&outcome);
            let cutoff = streak.observe(&outcome);
            observer.sound_finished(&outcome);

            if cutoff {
                observer.cutoff(MAX_CONSECUTIVE_FAILURES, attempted, total);
                if totals.saved == 0 && totals.skipped == 0 {
                    // Only an empty directory will go away, anything else is
                    // left in place.
                    if remove_dir(&out_dir).await.is_ok() {
                        observer.note(&format!(
                            "Removed empty directory: {}",
                            out_dir.display()
                        ));
                    }
                }
                break;
            }

            if attempted < total {
                sleep(self.delay).await;
            }
        }

        observer.board_finished(&totals, &out_dir);
        Ok(totals)
    }

    async fn snag_sound(&self, record: &SoundRecord, out_dir: &Path) -> DownloadOutcome {
        match self.try_snag(record, out_dir).await {
            Ok(outcome) => outcome,
            Err(err) => DownloadOutcome::Failed {
                reason: err.to_string(),
            },
        }
    }

    async fn try_snag(
        &self,
        record: &SoundRecord,
        out_dir: &Path,
    ) -> Result<DownloadOutcome, SnagError> {
        let res = fetch::fetch_stream(&self.client, &download_url(&record.id)).await?;

        let header_name = fetch::header_filename(res.headers());
        let final_name = plan_filename(record, header_name.as_deref());

        let dest = out_dir.join(&final_name);
        if dest.is_file() {
            // Response body stays unread, re-runs cost one request per sound
            // but no transfer.
            return Ok(DownloadOutcome::Skipped {
                filename: final_name,
            });
        }

        let size = fetch::save_body(res, &dest).await?;
        Ok(DownloadOutcome::Saved {
            filename: final_name,
            size_bytes: size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn failed() -> DownloadOutcome {
        DownloadOutcome::Failed {
            reason: "HTTP 404".to_string(),
        }
    }

    fn saved() -> DownloadOutcome {
        DownloadOutcome::Saved {
            filename: "A.mp3".to_string(),
            size_bytes: 10,
        }
    }

    #[test]
    fn streak_cuts_off_after_two_immediate_failures() {
        let outcomes = [failed(), failed(), saved(), failed()];
        let mut streak = FailureStreak::default();
        let mut processed = 0;
        for outcome in &outcomes {
            processed += 1;
            if streak.observe(outcome) {
                break;
            }
        }
        assert_eq!(processed, 2);
    }

    #[test]
    fn streak_resets_on_save_and_skip() {
        let mut streak = FailureStreak::default();
        assert!(!streak.observe(&failed()));
        assert!(!streak.observe(&saved()));
        assert!(!streak.observe(&failed()));
        assert!(!streak.observe(&DownloadOutcome::Skipped {
            filename: "A.mp3".to_string(),
        }));
        assert!(!streak.observe(&failed()));
        assert!(streak.observe(&failed()));
    }

    #[test]
    fn totals_count_each_variant() {
        let mut totals = SnagTotals::default();
        totals.record(&saved());
        totals.record(&failed());
        totals.record(&DownloadOutcome::Skipped {
            filename: "A.mp3".to_string(),
        });
        totals.record(&failed());
        assert_eq!(
            totals,
            SnagTotals {
                saved: 1,
                skipped: 1,
                failed: 2,
            }
        );
    }

    #[test]
    fn filename_prefers_page_title_over_header() {
        let record = SoundRecord {
            id: "412233".to_string(),
            title: "air horn".to_string(),
        };
        assert_eq!(
            plan_filename(&record, Some("3f9a8b7c.mp3")),
            "Air Horn.mp3"
        );
    }

    #[test]
    fn filename_falls_back_to_header_then_id() {
        let record = SoundRecord {
            id: "412233".to_string(),
            title: String::new(),
        };
        assert_eq!(
            plan_filename(&record, Some("loud_noise.mp3")),
            "Loud Noise.mp3"
        );
        assert_eq!(plan_filename(&record, None), "audio_412233.mp3");
    }

    #[test]
    fn planned_names_are_stable_across_runs() {
        // Same record, same plan, so the second run lands on the existing
        // file and skips.
        let tmp = TempDir::new("boardtest").unwrap();
        let record = SoundRecord {
            id: "7".to_string(),
            title: "quick brown fox".to_string(),
        };

        let first = plan_filename(&record, None);
        std::fs::write(tmp.path().join(&first), b"data").unwrap();

        let second = plan_filename(&record, None);
        assert_eq!(first, second);
        assert!(tmp.path().join(&second).is_file());
    }

    #[test]
    fn output_dir_joins_root_and_board() {
        let dl = BoardDownloader::new(
            "movie-quotes",
            Some(PathBuf::from("/tmp/sounds")),
            Duration::from_millis(0),
        )
        .unwrap();
        assert_eq!(dl.output_dir(), PathBuf::from("/tmp/sounds/movie-quotes"));
        assert_eq!(dl.board_name(), "movie-quotes");
    }
}
