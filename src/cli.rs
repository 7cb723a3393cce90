use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::soundboard::search::SearchOpts;

#[derive(Parser, Debug)]
#[clap(name = "Soundboard Downloader", author, version, about, long_about = None)]
pub struct Cli {
    /// Download a board by name (e.g. "starwars")
    #[clap(
        short,
        long,
        value_name = "NAME",
        help_heading = "MODE",
        conflicts_with_all(["url", "search", "search_and_download"])
    )]
    pub board: Option<String>,

    /// Download a board given its full page URL
    #[clap(
        short,
        long,
        value_name = "URL",
        help_heading = "MODE",
        conflicts_with_all(["search", "search_and_download"])
    )]
    pub url: Option<String>,

    /// Search for boards matching a query and list them
    #[clap(
        short,
        long,
        value_name = "QUERY",
        help_heading = "MODE",
        conflicts_with("search_and_download")
    )]
    pub search: Option<String>,

    /// Search for boards matching a query and download every result
    #[clap(long, value_name = "QUERY", help_heading = "MODE")]
    pub search_and_download: Option<String>,

    /// Stop searching after this many downloadable boards
    ///
    /// [max: 100]
    #[clap(
        short,
        long,
        value_parser(clap::value_parser!(u16).range(1..=100)),
        default_value_t = 20,
        value_name = "NUMBER",
        help_heading = "SEARCH"
    )]
    pub max: u16,

    /// Exclude boards with fewer views. Use 0 to disable the check
    #[clap(
        long,
        value_parser,
        default_value_t = 10,
        value_name = "NUMBER",
        help_heading = "SEARCH"
    )]
    pub min_views: u64,

    /// Exclude boards with fewer sounds. Use 0 to disable the check
    #[clap(
        long,
        value_parser,
        default_value_t = 3,
        value_name = "NUMBER",
        help_heading = "SEARCH"
    )]
    pub min_sounds: u16,

    /// Show every analyzed board along with the filters it failed
    #[clap(long, action, default_value_t = false, help_heading = "SEARCH")]
    pub debug: bool,

    /// Where to create per-board download directories
    #[clap(
        short = 'd',
        long,
        value_name = "PATH",
        help_heading = "SAVE"
    )]
    pub download_root: Option<PathBuf>,

    /// Milliseconds to wait between consecutive requests
    #[clap(
        long,
        value_parser,
        default_value_t = 500,
        value_name = "MILLIS",
        help_heading = "DOWNLOAD"
    )]
    pub delay_ms: u64,
}

impl Cli {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn search_opts(&self) -> SearchOpts {
        SearchOpts {
            max_downloadable: self.max as usize,
            min_views: self.min_views,
            min_sounds: self.min_sounds as usize,
            delay: self.delay(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["sbdl", "--board", "starwars"]).unwrap();
        assert_eq!(cli.board.as_deref(), Some("starwars"));
        assert_eq!(cli.max, 20);
        assert_eq!(cli.min_views, 10);
        assert_eq!(cli.min_sounds, 3);
        assert_eq!(cli.delay(), Duration::from_millis(500));
        assert!(!cli.debug);
    }

    #[test]
    fn modes_conflict() {
        assert!(Cli::try_parse_from(["sbdl", "--board", "a", "--search", "b"]).is_err());
        assert!(Cli::try_parse_from(["sbdl", "--url", "u", "--search-and-download", "q"]).is_err());
    }

    #[test]
    fn search_opts_map_flags() {
        let cli = Cli::try_parse_from([
            "sbdl",
            "--search",
            "horn",
            "--max",
            "5",
            "--min-views",
            "0",
            "--min-sounds",
            "0",
            "--delay-ms",
            "100",
        ])
        .unwrap();
        let opts = cli.search_opts();
        assert_eq!(opts.max_downloadable, 5);
        assert_eq!(opts.min_views, 0);
        assert_eq!(opts.min_sounds, 0);
        assert_eq!(opts.delay, Duration::from_millis(100));
    }

    #[test]
    fn max_range_is_enforced() {
        assert!(Cli::try_parse_from(["sbdl", "--search", "q", "--max", "0"]).is_err());
        assert!(Cli::try_parse_from(["sbdl", "--search", "q", "--max", "101"]).is_err());
    }
}
