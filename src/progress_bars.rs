//! Terminal presentation: indicatif bar styles and the console implementation
//! of the progress seam.
use std::fmt::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use bytesize::ByteSize;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressState, ProgressStyle};

use crate::soundboard::board::{DownloadOutcome, SnagTotals};
use crate::soundboard::progress::SnagObserver;
use crate::soundboard::search::BoardSummary;

const PROGRESS_CHARS: &str = "━━";

pub struct BarTemplates {
    pub main: &'static str,
}

impl Default for BarTemplates {
    fn default() -> Self {
        Self {
            main: "{spinner:.green.bold} {elapsed_precise:.bold} {wide_bar:.green/white.dim} {percent:.bold}  {pos:.green} ({msg:.bold.blue} | eta. {eta:.blue})",
        }
    }
}

pub fn master_progress_style(templates: &BarTemplates) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(templates.main)
        .unwrap()
        .with_key("pos", |state: &ProgressState, w: &mut dyn Write| {
            write!(w, "{}/{}", state.pos(), state.len().unwrap()).unwrap();
        })
        .with_key("percent", |state: &ProgressState, w: &mut dyn Write| {
            write!(w, "{:>3.0}%", state.fraction() * 100_f32).unwrap();
        })
        .progress_chars(PROGRESS_CHARS)
}

/// Renders progress events on the terminal: one master bar per board run plus
/// per-sound report lines.
pub struct ConsoleReporter {
    debug_mode: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(debug_mode: bool) -> Self {
        Self {
            debug_mode,
            bar: Mutex::new(None),
        }
    }

    /// Prints above the live bar when one is active, plainly otherwise.
    fn println(&self, line: &str) {
        let guard = self.bar.lock().unwrap_or_else(|err| err.into_inner());
        match guard.as_ref() {
            Some(bar) => bar.println(line),
            None => println!("{}", line),
        }
    }

    fn set_bar(&self, bar: Option<ProgressBar>) {
        let mut guard = self.bar.lock().unwrap_or_else(|err| err.into_inner());
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = bar;
    }

    fn tick(&self, message: Option<String>) {
        let guard = self.bar.lock().unwrap_or_else(|err| err.into_inner());
        if let Some(bar) = guard.as_ref() {
            match message {
                Some(msg) => bar.set_message(msg),
                None => bar.inc(1),
            }
        }
    }
}

impl SnagObserver for ConsoleReporter {
    fn board_started(&self, board: &str, sounds: usize, buttons: usize, output_dir: &Path) {
        println!(
            "{} {}",
            "Snagging from board:".bold().cyan(),
            board.bold()
        );
        println!(
            "{}",
            format!("Located {} audio files to snag!", sounds).green()
        );
        println!(
            "   {}",
            format!("({} download buttons detected)", buttons).dimmed()
        );
        println!(
            "   {}",
            format!("Download location: {}", output_dir.display()).dimmed()
        );

        let bar = ProgressBar::new(sounds as u64)
            .with_style(master_progress_style(&BarTemplates::default()));
        bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(60));
        bar.enable_steady_tick(Duration::from_millis(100));
        self.set_bar(Some(bar));
    }

    fn sound_started(&self, _index: usize, _total: usize, sound_id: &str) {
        self.tick(Some(format!("id {}", sound_id)));
    }

    fn sound_finished(&self, outcome: &DownloadOutcome) {
        match outcome {
            DownloadOutcome::Saved {
                filename,
                size_bytes,
            } => self.println(&format!(
                "  {} {} {}",
                "Snagged:".bold().green(),
                filename,
                format!("({})", ByteSize::b(*size_bytes)).dimmed()
            )),
            DownloadOutcome::Skipped { filename } => self.println(&format!(
                "  {} {}",
                "Skipped (exists):".bold().yellow(),
                filename
            )),
            DownloadOutcome::Failed { reason } => {
                self.println(&format!("  {} {}", "Failed:".bold().red(), reason))
            }
        }
        self.tick(None);
    }

    fn cutoff(&self, failures: u32, attempted: usize, total: usize) {
        self.println(&format!(
            "{}",
            format!("{} consecutive download failures detected!", failures)
                .bold()
                .red()
        ));
        self.println(&format!(
            "   This board appears to have broken download links. Attempted {}/{} files, skipping the remaining {}.",
            attempted,
            total,
            total - attempted
        ));
    }

    fn board_finished(&self, totals: &SnagTotals, output_dir: &Path) {
        self.set_bar(None);

        println!(
            "\n{} {} files saved to:",
            "Snagging complete!".bold().green(),
            totals.saved.to_string().cyan()
        );
        println!("  {}", output_dir.display().to_string().bold());
        if totals.skipped > 0 {
            println!(
                "  {}",
                format!("({} files were already present)", totals.skipped).yellow()
            );
        }
        if totals.failed > 0 {
            println!(
                "  {}",
                format!("{} files failed to download", totals.failed).red()
            );
        }
    }

    fn search_page(&self, page: u64) {
        if self.debug_mode {
            println!("{}\n", format!("Searching page {}...", page).dimmed());
        } else if page == 1 {
            println!("{}\n", "Searching...".dimmed());
        }
    }

    fn board_analyzed(
        &self,
        summary: &BoardSummary,
        passed_filters: bool,
        filter_reasons: &[String],
        downloadable_so_far: usize,
        target: usize,
    ) {
        let qualifies = passed_filters && summary.has_downloads;
        if !qualifies && !self.debug_mode {
            return;
        }

        let counter = format!("[{}/{}]", downloadable_so_far, target).dimmed();
        if qualifies {
            println!("{} {}", counter, summary.name.cyan());
        } else {
            println!("{} Analyzing {}...", counter, summary.name.cyan());
        }

        let capability = if summary.has_downloads {
            "downloadable".green()
        } else {
            "play-only".red()
        };
        println!(
            "  {} {} sounds {}",
            capability,
            summary.sound_count,
            format!("(views: {})", summary.views).dimmed()
        );

        if self.debug_mode && !passed_filters {
            for reason in filter_reasons {
                println!("  {}", format!("Filtered out: {}", reason).yellow());
            }
        }
    }

    fn note(&self, message: &str) {
        self.println(&format!("   {}", message.dimmed()));
    }
}
